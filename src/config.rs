use crate::types::Result;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::warn;

/// Default config document looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "blog_config.yaml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.7,
            max_tokens: 1500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    pub min_word_count: u32,
    pub style: String,
    pub target_audience: String,
    pub include_sources: bool,
    pub include_data: bool,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            min_word_count: 1500,
            style: "professional".to_string(),
            target_audience: "professionals".to_string(),
            include_sources: true,
            include_data: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub llm_delay_seconds: f64,
    pub search_delay_seconds: f64,
    pub max_retries: u32,
    pub backoff_multiplier: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            llm_delay_seconds: 2.0,
            search_delay_seconds: 1.0,
            max_retries: 3,
            backoff_multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub verbose_progress: bool,
    pub show_research_summary: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            verbose_progress: true,
            show_research_summary: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_results: usize,
    pub category_1_searches: usize,
    pub category_2_searches: usize,
    pub category_3_searches: usize,
    pub category_4_searches: usize,
    pub news_results: usize,
}

impl SearchConfig {
    /// Per-category query counts in category order
    pub fn category_counts(&self) -> [usize; 4] {
        [
            self.category_1_searches,
            self.category_2_searches,
            self.category_3_searches,
            self.category_4_searches,
        ]
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            category_1_searches: 3,
            category_2_searches: 3,
            category_3_searches: 2,
            category_4_searches: 2,
            news_results: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StrategyAgentConfig {
    pub analysis_depth: String,
    pub content_angle_generation: usize,
}

impl Default for StrategyAgentConfig {
    fn default() -> Self {
        Self {
            analysis_depth: "comprehensive".to_string(),
            content_angle_generation: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeoAgentConfig {
    pub primary_keywords: usize,
    pub secondary_keywords: usize,
}

impl Default for SeoAgentConfig {
    fn default() -> Self {
        Self {
            primary_keywords: 3,
            secondary_keywords: 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResearchAgentConfig {
    pub focus_areas: Vec<String>,
}

impl Default for ResearchAgentConfig {
    fn default() -> Self {
        Self {
            focus_areas: vec![
                "market_trends".to_string(),
                "competitor_analysis".to_string(),
                "industry_news".to_string(),
                "data_points".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct EditorAgentConfig {
    pub keyword_density_check: bool,
    pub meta_description_generation: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AgentsConfig {
    pub strategy: StrategyAgentConfig,
    pub seo: SeoAgentConfig,
    pub research: ResearchAgentConfig,
    pub editor: EditorAgentConfig,
}

/// All settings for one generator run, assembled once at startup and passed
/// by reference into component constructors. Every field has a default, so a
/// partial (or missing) config document still yields a complete config.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneratorConfig {
    pub llm: LlmConfig,
    pub blog: BlogConfig,
    pub rate_limiting: RateLimitConfig,
    pub monitoring: MonitoringConfig,
    pub search: SearchConfig,
    pub agents: AgentsConfig,
}

impl GeneratorConfig {
    /// Load from a YAML file. A missing file falls back to defaults; a file
    /// that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(raw) => Self::from_yaml(&raw),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Config file {} not found. Using defaults.", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }
}
