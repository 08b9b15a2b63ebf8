use crate::config::SearchConfig;
use crate::delay::DelayPolicy;
use crate::types::{NewsHit, Result, SearchHit};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

pub const SEARCH_ENDPOINT: &str = "https://google.serper.dev/search";
pub const NEWS_ENDPOINT: &str = "https://google.serper.dev/news";

/// Default result count for a standalone news search
pub const DEFAULT_NEWS_RESULTS: usize = 3;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Web and news search behind a uniform result-list contract.
///
/// Both operations degrade to an empty list on any failure; callers treat
/// empty as "no data", never as a pipeline error.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search_web(&self, query: &str, num_results: Option<usize>) -> Vec<SearchHit>;
    async fn search_news(&self, query: &str, num_results: usize) -> Vec<NewsHit>;
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    num: usize,
    gl: &'static str,
    hl: &'static str,
}

#[derive(Deserialize, Default)]
struct WebSearchResponse {
    #[serde(default)]
    organic: Vec<RawSearchItem>,
}

#[derive(Deserialize)]
struct RawSearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
}

#[derive(Deserialize, Default)]
struct NewsSearchResponse {
    #[serde(default)]
    news: Vec<RawNewsItem>,
}

#[derive(Deserialize)]
struct RawNewsItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    source: String,
}

/// Serper.dev client. Without an API key every search returns empty
/// immediately with no network call.
pub struct SerperClient {
    client: Client,
    api_key: Option<String>,
    max_results: usize,
    delays: Arc<dyn DelayPolicy>,
}

impl SerperClient {
    pub fn new(api_key: Option<String>, search: &SearchConfig, delays: Arc<dyn DelayPolicy>) -> Self {
        let client = Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            max_results: search.max_results,
            delays,
        }
    }

    async fn post_search<T>(&self, endpoint: &str, api_key: &str, query: &str, num: usize) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let request = SearchRequest {
            q: query,
            num,
            gl: "us",
            hl: "en",
        };

        let response = self
            .client
            .post(endpoint)
            .header("X-API-KEY", api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl SearchProvider for SerperClient {
    async fn search_web(&self, query: &str, num_results: Option<usize>) -> Vec<SearchHit> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Vec::new();
        };
        let num = num_results.unwrap_or(self.max_results);

        match self.post_search::<WebSearchResponse>(SEARCH_ENDPOINT, api_key, query, num).await {
            Ok(data) => {
                let hits: Vec<SearchHit> = data
                    .organic
                    .into_iter()
                    .take(num)
                    .map(|item| SearchHit {
                        title: item.title,
                        snippet: item.snippet,
                        link: item.link,
                    })
                    .collect();
                debug!("Search {:?} returned {} hits", query, hits.len());
                // Pace the next query in a multi-query sequence
                self.delays.pace_search().await;
                hits
            }
            Err(e) => {
                warn!("Search error for {:?}: {}", query, e);
                Vec::new()
            }
        }
    }

    async fn search_news(&self, query: &str, num_results: usize) -> Vec<NewsHit> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Vec::new();
        };

        match self.post_search::<NewsSearchResponse>(NEWS_ENDPOINT, api_key, query, num_results).await {
            Ok(data) => {
                let hits: Vec<NewsHit> = data
                    .news
                    .into_iter()
                    .take(num_results)
                    .map(|item| NewsHit {
                        title: item.title,
                        snippet: item.snippet,
                        date: item.date,
                        source: item.source,
                    })
                    .collect();
                self.delays.pace_news().await;
                hits
            }
            Err(e) => {
                warn!("News search error for {:?}: {}", query, e);
                Vec::new()
            }
        }
    }
}

/// Test provider returning canned hits and recording every query it sees
pub struct MockSearchProvider {
    hits: Vec<SearchHit>,
    news: Vec<NewsHit>,
    queries: Mutex<Vec<String>>,
}

impl MockSearchProvider {
    pub fn new(hits: Vec<SearchHit>, news: Vec<NewsHit>) -> Self {
        Self {
            hits,
            news,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("queries lock").clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search_web(&self, query: &str, num_results: Option<usize>) -> Vec<SearchHit> {
        self.queries.lock().expect("queries lock").push(query.to_string());
        let num = num_results.unwrap_or(self.hits.len());
        self.hits.iter().take(num).cloned().collect()
    }

    async fn search_news(&self, query: &str, num_results: usize) -> Vec<NewsHit> {
        self.queries.lock().expect("queries lock").push(query.to_string());
        self.news.iter().take(num_results).cloned().collect()
    }
}
