use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// One general web search result as consumed by the research pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

/// One news search result; news items carry a date and source instead of a link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsHit {
    pub title: String,
    pub snippet: String,
    pub date: String,
    pub source: String,
}

/// Aggregated research for one topic, organized into four buckets.
/// Built once per run and appended to while queries execute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRecord {
    pub topic: String,
    pub trends: Vec<SearchHit>,
    pub competitors: Vec<SearchHit>,
    pub news: Vec<NewsHit>,
    pub data: Vec<SearchHit>,
}

impl ResearchRecord {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            trends: Vec::new(),
            competitors: Vec::new(),
            news: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Total number of sources gathered across all buckets
    pub fn total_sources(&self) -> usize {
        self.trends.len() + self.competitors.len() + self.news.len() + self.data.len()
    }
}

/// Loosely-typed strategy output from the strategy stage.
///
/// The underlying map comes either from a parsed model response or from one
/// of the deterministic fallback constructors, so downstream stages always
/// see the same key contract regardless of how the stage degraded.
#[derive(Debug, Clone)]
pub struct StrategyData(Map<String, Value>);

impl StrategyData {
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Fallback for a response that arrived but could not be parsed as JSON
    pub fn parse_fallback(topic: &str) -> Self {
        let value = json!({
            "target_audience": {
                "primary": "professionals",
                "pain_points": ["information gaps"],
                "preferences": "detailed analysis"
            },
            "competitive_landscape": {
                "gaps": ["unique perspective"],
                "opportunities": ["detailed insights"]
            },
            "content_angles": [
                format!("Comprehensive guide to {topic}"),
                format!("Latest trends in {topic}"),
                format!("Practical applications of {topic}")
            ],
            "market_opportunities": ["emerging trends", "practical applications"],
            "strategic_positioning": {
                "unique_value": format!("Expert insights on {topic}"),
                "key_messages": ["actionable advice"],
                "tone": "professional"
            }
        });
        Self(expect_object(value))
    }

    /// Fallback for a completely absent response
    pub fn absent_fallback(topic: &str) -> Self {
        let value = json!({
            "target_audience": {"primary": "general audience"},
            "content_angles": [format!("Understanding {topic}")],
            "strategic_positioning": {"tone": "informative"}
        });
        Self(expect_object(value))
    }

    pub fn content_angles(&self) -> Vec<String> {
        string_list(self.0.get("content_angles"))
    }

    pub fn primary_audience(&self) -> Option<String> {
        nested_str(&self.0, "target_audience", "primary")
    }

    pub fn unique_value(&self) -> Option<String> {
        nested_str(&self.0, "strategic_positioning", "unique_value")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Loosely-typed SEO output from the SEO stage, same degradation contract
/// as [`StrategyData`].
#[derive(Debug, Clone)]
pub struct SeoData(Map<String, Value>);

impl SeoData {
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn parse_fallback(topic: &str, target_audience: &str) -> Self {
        let value = json!({
            "primary_keywords": [
                topic,
                format!("{topic} guide"),
                format!("best {topic}")
            ],
            "secondary_keywords": [
                format!("how to {topic}"),
                format!("{topic} tips"),
                format!("{topic} strategies"),
                format!("{topic} benefits")
            ],
            "search_intent": "informational",
            "content_structure": {
                "h1": format!("Complete Guide to {topic}"),
                "h2_sections": [
                    "Introduction",
                    "Key Benefits",
                    "Best Practices",
                    "Common Challenges",
                    "Conclusion"
                ]
            },
            "meta_optimization": {
                "title": format!("{topic}: Complete Guide for {target_audience}"),
                "description": format!(
                    "Discover everything about {topic}. Expert insights, practical tips, and actionable strategies."
                ),
                "focus_keyword": topic
            },
            "seo_recommendations": [
                "Use keywords naturally",
                "Include internal links",
                "Optimize for featured snippets"
            ]
        });
        Self(expect_object(value))
    }

    pub fn absent_fallback(topic: &str) -> Self {
        let value = json!({
            "primary_keywords": [topic],
            "secondary_keywords": [format!("{topic} guide")],
            "search_intent": "informational"
        });
        Self(expect_object(value))
    }

    pub fn primary_keywords(&self) -> Vec<String> {
        string_list(self.0.get("primary_keywords"))
    }

    pub fn secondary_keywords(&self) -> Vec<String> {
        string_list(self.0.get("secondary_keywords"))
    }

    pub fn search_intent(&self) -> Option<String> {
        self.0.get("search_intent").and_then(Value::as_str).map(str::to_string)
    }

    pub fn h2_sections(&self) -> Vec<String> {
        string_list(self.0.get("content_structure").and_then(|v| v.get("h2_sections")))
    }

    pub fn meta_title(&self) -> Option<String> {
        nested_str(&self.0, "meta_optimization", "title")
    }

    pub fn meta_description(&self) -> Option<String> {
        nested_str(&self.0, "meta_optimization", "description")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

fn expect_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn nested_str(map: &Map<String, Value>, outer: &str, inner: &str) -> Option<String> {
    map.get(outer)?
        .get(inner)?
        .as_str()
        .map(str::to_string)
}

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Completion failed with status {status}: {body}")]
    CompletionStatus { status: u16, body: String },

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
