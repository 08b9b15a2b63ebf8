use crate::config::{GeneratorConfig, MonitoringConfig, SearchConfig};
use crate::search::SearchProvider;
use crate::types::ResearchRecord;
use chrono::{Datelike, Local};
use std::sync::Arc;
use tracing::{debug, info};

/// Focus areas used to pad an underspecified configuration, in order
pub const DEFAULT_FOCUS_AREAS: [&str; 4] = [
    "market_trends",
    "competitor_analysis",
    "industry_news",
    "data_points",
];

/// Issues a bounded sequence of categorized search queries for a topic and
/// aggregates the results into a [`ResearchRecord`]. Queries run strictly
/// one at a time to respect external rate limits.
pub struct ResearchOrchestrator {
    search: Arc<dyn SearchProvider>,
    search_config: SearchConfig,
    focus_areas: Vec<String>,
    monitoring: MonitoringConfig,
}

impl ResearchOrchestrator {
    pub fn new(search: Arc<dyn SearchProvider>, config: &GeneratorConfig) -> Self {
        Self {
            search,
            search_config: config.search.clone(),
            focus_areas: config.agents.research.focus_areas.clone(),
            monitoring: config.monitoring.clone(),
        }
    }

    /// Build the ordered query list: the bare topic first, then the
    /// configured number of template queries for each of four focus areas.
    pub fn build_queries(&self, topic: &str) -> Vec<String> {
        let mut focus_areas = self.focus_areas.clone();
        // Pad deterministically with the defaults in order, then cap at four
        if focus_areas.len() < 4 {
            for default in DEFAULT_FOCUS_AREAS.iter().skip(focus_areas.len()) {
                focus_areas.push(default.to_string());
            }
        }
        focus_areas.truncate(4);

        let counts = self.search_config.category_counts();
        let mut queries = vec![topic.to_string()];
        for (area, count) in focus_areas.iter().zip(counts) {
            queries.extend(query_templates(area, topic).into_iter().take(count));
        }
        queries
    }

    pub async fn conduct_research(&self, topic: &str) -> ResearchRecord {
        info!("Researching: {}", topic);

        let mut record = ResearchRecord::new(topic);
        let queries = self.build_queries(topic);

        if self.monitoring.verbose_progress {
            info!("4-category research plan: {} queries", queries.len());
        }

        for (index, query) in queries.iter().enumerate() {
            if self.monitoring.verbose_progress {
                info!("Search {}/{}: {}", index + 1, queries.len(), query);
            }
            let results = self.search.search_web(query, None).await;
            debug!("Query {} returned {} results", index, results.len());

            // Bucket membership follows query position, not the template
            // that generated the query
            match index {
                0 => record.trends.extend(results),
                1 => record.data.extend(results),
                2 => record.competitors.extend(results),
                _ => record.data.extend(results),
            }
        }

        // Separate news search for recent developments
        let news_query = format!("{topic} latest news");
        let news = self
            .search
            .search_news(&news_query, self.search_config.news_results)
            .await;
        record.news.extend(news);

        if self.monitoring.show_research_summary {
            info!("Research complete: {} sources", record.total_sources());
        }
        record
    }
}

/// Query template library keyed by focus area. An unrecognized focus area
/// contributes no queries.
pub fn query_templates(focus_area: &str, topic: &str) -> Vec<String> {
    let year = Local::now().year();
    match focus_area {
        "market_trends" => vec![
            format!("{topic} trends {year}"),
            format!("{topic} market analysis {year}"),
            format!("future of {topic}"),
            format!("{topic} industry outlook"),
        ],
        "competitor_analysis" => vec![
            format!("best {topic} companies"),
            format!("top {topic} providers"),
            format!("{topic} competitive landscape"),
            format!("leading {topic} solutions"),
        ],
        "industry_news" => vec![
            format!("{topic} latest news"),
            format!("{topic} recent developments"),
            format!("{topic} industry updates"),
            format!("new {topic} technologies"),
        ],
        "research" => vec![
            format!("{topic} research studies"),
            format!("{topic} case studies"),
            format!("{topic} academic research"),
            format!("{topic} white papers"),
        ],
        "tips" => vec![
            format!("how to {topic}"),
            format!("{topic} best practices"),
            format!("{topic} tips and tricks"),
            format!("{topic} implementation guide"),
        ],
        "solutions" => vec![
            format!("{topic} solutions"),
            format!("{topic} tools and software"),
            format!("{topic} platforms"),
            format!("best {topic} tools"),
        ],
        "youtube_research" => vec![
            format!("{topic} tutorials site:youtube.com"),
            format!("{topic} reviews site:youtube.com"),
            format!("how to {topic} site:youtube.com"),
            format!("{topic} guide site:youtube.com"),
        ],
        "data_points" => vec![
            format!("{topic} statistics {year}"),
            format!("{topic} market size data"),
            format!("{topic} growth statistics"),
            format!("{topic} survey results"),
        ],
        _ => Vec::new(),
    }
}

/// Render a research record into the compact text block consumed by later
/// prompts. Pure and deterministic; the output is never re-parsed.
pub fn format_research(record: &ResearchRecord) -> String {
    let mut lines = vec![format!("RESEARCH DATA: {}\n", record.topic)];

    if !record.trends.is_empty() {
        lines.push("MARKET TRENDS:".to_string());
        for (i, hit) in record.trends.iter().take(3).enumerate() {
            lines.push(format!("{}. {}", i + 1, hit.title));
            lines.push(format!("   {}...", snippet_excerpt(&hit.snippet)));
            lines.push(String::new());
        }
    }

    if !record.competitors.is_empty() {
        lines.push("COMPETITIVE LANDSCAPE:".to_string());
        for (i, hit) in record.competitors.iter().take(3).enumerate() {
            lines.push(format!("{}. {}", i + 1, hit.title));
            lines.push(format!("   {}...", snippet_excerpt(&hit.snippet)));
            lines.push(String::new());
        }
    }

    if !record.news.is_empty() {
        lines.push("LATEST NEWS:".to_string());
        for (i, hit) in record.news.iter().take(2).enumerate() {
            let date = if hit.date.is_empty() { "Recent" } else { &hit.date };
            lines.push(format!("{}. {} ({})", i + 1, hit.title, date));
            lines.push(format!("   {}...", snippet_excerpt(&hit.snippet)));
            lines.push(String::new());
        }
    }

    lines.join("\n")
}

// First 200 characters of a snippet, char-boundary safe
fn snippet_excerpt(snippet: &str) -> String {
    snippet.chars().take(200).collect()
}
