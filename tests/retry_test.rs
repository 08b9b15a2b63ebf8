use async_trait::async_trait;
use blog_generator::config::RateLimitConfig;
use blog_generator::delay::{DelayPolicy, SleepDelayPolicy};
use blog_generator::llm_client::{CompletionPayload, MockCompletionProvider, ResilientCaller};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
enum DelayEvent {
    Backoff(u32),
    PaceLlm,
    RateLimitHold(u32),
    PaceSearch,
    PaceNews,
}

/// Records every delay request without sleeping
#[derive(Default)]
struct RecordingDelayPolicy {
    events: Mutex<Vec<DelayEvent>>,
}

impl RecordingDelayPolicy {
    fn events(&self) -> Vec<DelayEvent> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: DelayEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl DelayPolicy for RecordingDelayPolicy {
    async fn backoff(&self, attempt: u32) {
        self.record(DelayEvent::Backoff(attempt));
    }
    async fn pace_llm(&self) {
        self.record(DelayEvent::PaceLlm);
    }
    async fn rate_limit_hold(&self, attempt: u32) {
        self.record(DelayEvent::RateLimitHold(attempt));
    }
    async fn pace_search(&self) {
        self.record(DelayEvent::PaceSearch);
    }
    async fn pace_news(&self) {
        self.record(DelayEvent::PaceNews);
    }
}

#[tokio::test]
async fn rate_limited_provider_exhausts_retries() {
    let _ = tracing_subscriber::fmt().try_init();

    let provider = Arc::new(MockCompletionProvider::failing("429 rate limit exceeded"));
    let delays = Arc::new(RecordingDelayPolicy::default());
    let caller = ResilientCaller::new(provider.clone(), delays.clone(), 3);

    let result = caller.call("prompt").await;
    info!("Result after exhausted retries: {:?}", result);

    assert!(result.is_none());
    assert_eq!(provider.call_count(), 3, "should attempt exactly max_retries times");
    // Holds on non-final attempts; the following attempt still backs off
    assert_eq!(
        delays.events(),
        vec![
            DelayEvent::RateLimitHold(0),
            DelayEvent::Backoff(1),
            DelayEvent::RateLimitHold(1),
            DelayEvent::Backoff(2),
        ]
    );
}

#[test]
fn rate_limit_hold_schedule_is_steeper_than_backoff() {
    assert_eq!(SleepDelayPolicy::rate_limit_duration(0), Duration::from_secs(30));
    assert_eq!(SleepDelayPolicy::rate_limit_duration(1), Duration::from_secs(60));
    assert_eq!(SleepDelayPolicy::rate_limit_duration(2), Duration::from_secs(90));
}

#[test]
fn backoff_grows_exponentially_with_attempt() {
    let policy = SleepDelayPolicy::from_config(&RateLimitConfig::default());
    assert_eq!(policy.backoff_duration(1), Duration::from_secs(4));
    assert_eq!(policy.backoff_duration(2), Duration::from_secs(8));
    assert_eq!(policy.backoff_duration(3), Duration::from_secs(16));
}

#[tokio::test]
async fn success_after_failures_backs_off_then_paces() {
    let _ = tracing_subscriber::fmt().try_init();

    let provider = Arc::new(MockCompletionProvider::succeeding_after(
        2,
        "connection reset by peer",
        "generated text",
    ));
    let delays = Arc::new(RecordingDelayPolicy::default());
    let caller = ResilientCaller::new(provider.clone(), delays.clone(), 3);

    let result = caller.call("prompt").await;

    assert_eq!(result.as_deref(), Some("generated text"));
    assert_eq!(provider.call_count(), 3);
    // k failed attempts produce k backoff sleeps, then one pacing sleep
    assert_eq!(
        delays.events(),
        vec![DelayEvent::Backoff(1), DelayEvent::Backoff(2), DelayEvent::PaceLlm]
    );
}

#[tokio::test]
async fn immediate_success_only_paces() {
    let provider = Arc::new(MockCompletionProvider::always("hello"));
    let delays = Arc::new(RecordingDelayPolicy::default());
    let caller = ResilientCaller::new(provider.clone(), delays.clone(), 3);

    let result = caller.call("prompt").await;

    assert_eq!(result.as_deref(), Some("hello"));
    assert_eq!(provider.call_count(), 1);
    assert_eq!(delays.events(), vec![DelayEvent::PaceLlm]);
}

#[tokio::test]
async fn ordinary_failure_never_uses_rate_limit_schedule() {
    let provider = Arc::new(MockCompletionProvider::failing("connection refused"));
    let delays = Arc::new(RecordingDelayPolicy::default());
    let caller = ResilientCaller::new(provider.clone(), delays.clone(), 3);

    let result = caller.call("prompt").await;

    assert!(result.is_none());
    assert_eq!(provider.call_count(), 3);
    assert_eq!(delays.events(), vec![DelayEvent::Backoff(1), DelayEvent::Backoff(2)]);
}

#[test]
fn payload_extraction_precedence() {
    let content: CompletionPayload =
        serde_json::from_value(serde_json::json!({"role": "assistant", "content": "from content"}))
            .unwrap();
    assert_eq!(content.into_text(), "from content");

    let text: CompletionPayload =
        serde_json::from_value(serde_json::json!({"text": "from text"})).unwrap();
    assert_eq!(text.into_text(), "from text");

    let plain: CompletionPayload = serde_json::from_value(serde_json::json!("plain string")).unwrap();
    assert_eq!(plain.into_text(), "plain string");

    // Anything else falls back to string conversion
    let other: CompletionPayload = serde_json::from_value(serde_json::json!(42)).unwrap();
    assert_eq!(other.into_text(), "42");
}
