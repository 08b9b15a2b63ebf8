use crate::config::LlmConfig;
use crate::delay::DelayPolicy;
use crate::types::{GeneratorError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub const CHAT_COMPLETIONS_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Closed set of response shapes a completion provider may hand back.
///
/// Variants are tried in declaration order, which fixes the extraction
/// precedence: content field, then text field, then a plain string, then
/// string conversion of whatever JSON value arrived.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CompletionPayload {
    Content { content: String },
    Text { text: String },
    Plain(String),
    Other(serde_json::Value),
}

impl CompletionPayload {
    pub fn into_text(self) -> String {
        match self {
            CompletionPayload::Content { content } => content,
            CompletionPayload::Text { text } => text,
            CompletionPayload::Plain(text) => text,
            CompletionPayload::Other(value) => value.to_string(),
        }
    }
}

/// One textual completion exchange with a generative model
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<CompletionPayload>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: CompletionPayload,
}

/// Groq chat-completions client. One JSON POST per call; model settings
/// come from the llm config section.
pub struct GroqClient {
    client: Client,
    api_key: String,
    config: LlmConfig,
    endpoint: String,
}

impl GroqClient {
    pub fn new(api_key: String, config: LlmConfig) -> Self {
        let client = Client::builder()
            .gzip(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            config,
            endpoint: CHAT_COMPLETIONS_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl CompletionProvider for GroqClient {
    async fn complete(&self, prompt: &str) -> Result<CompletionPayload> {
        let request = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Keep the status code in the error description so the retry
            // loop's 429 substring match can see it
            let body = response.text().await.unwrap_or_default();
            return Err(GeneratorError::CompletionStatus {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| GeneratorError::General("completion response had no choices".to_string()))
    }
}

/// Wraps a completion provider with retry, backoff and pacing.
///
/// All failure paths funnel to `None`; nothing is raised to the caller.
pub struct ResilientCaller {
    provider: Arc<dyn CompletionProvider>,
    delays: Arc<dyn DelayPolicy>,
    max_retries: u32,
}

impl ResilientCaller {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        delays: Arc<dyn DelayPolicy>,
        max_retries: u32,
    ) -> Self {
        Self {
            provider,
            delays,
            max_retries,
        }
    }

    pub async fn call(&self, prompt: &str) -> Option<String> {
        self.call_with_retries(prompt, self.max_retries).await
    }

    pub async fn call_with_retries(&self, prompt: &str, max_retries: u32) -> Option<String> {
        for attempt in 0..max_retries {
            if attempt > 0 {
                debug!("Waiting before retry {}", attempt + 1);
                self.delays.backoff(attempt).await;
            }

            match self.provider.complete(prompt).await {
                Ok(payload) => {
                    let content = payload.into_text();
                    // Pace the next call regardless of how many attempts this took
                    self.delays.pace_llm().await;
                    return Some(content);
                }
                Err(e) => {
                    let description = e.to_string().to_lowercase();
                    if (description.contains("429") || description.contains("rate limit"))
                        && attempt + 1 < max_retries
                    {
                        warn!("Rate limit hit on attempt {}, holding before retry", attempt + 1);
                        self.delays.rate_limit_hold(attempt).await;
                        continue;
                    }

                    warn!("LLM call failed (attempt {}): {}", attempt + 1, e);
                    if attempt + 1 == max_retries {
                        return None;
                    }
                }
            }
        }

        None
    }
}

/// Test provider that errors a fixed number of times before succeeding
pub struct MockCompletionProvider {
    reply: String,
    error: String,
    succeed_after: u32,
    calls: AtomicU32,
}

impl MockCompletionProvider {
    /// Succeeds immediately on every call
    pub fn always(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            error: String::new(),
            succeed_after: 0,
            calls: AtomicU32::new(0),
        }
    }

    /// Fails every call with the given error description
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            reply: String::new(),
            error: error.into(),
            succeed_after: u32::MAX,
            calls: AtomicU32::new(0),
        }
    }

    /// Fails `attempts` times with `error`, then succeeds with `reply`
    pub fn succeeding_after(attempts: u32, error: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            error: error.into(),
            succeed_after: attempts,
            calls: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, _prompt: &str) -> Result<CompletionPayload> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.succeed_after {
            Err(GeneratorError::General(self.error.clone()))
        } else {
            Ok(CompletionPayload::Plain(self.reply.clone()))
        }
    }
}

/// Test provider that replays a fixed sequence of outcomes, one per call.
/// An exhausted script keeps failing.
pub struct ScriptedCompletionProvider {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
}

impl ScriptedCompletionProvider {
    pub fn new(script: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletionProvider {
    async fn complete(&self, _prompt: &str) -> Result<CompletionPayload> {
        let next = self.script.lock().expect("script lock").pop_front();
        match next {
            Some(Ok(reply)) => Ok(CompletionPayload::Plain(reply)),
            Some(Err(error)) => Err(GeneratorError::General(error)),
            None => Err(GeneratorError::General("script exhausted".to_string())),
        }
    }
}
