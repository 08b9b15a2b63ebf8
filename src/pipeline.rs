use crate::config::GeneratorConfig;
use crate::llm_client::ResilientCaller;
use crate::parser::{extract_json_object, JsonExtraction};
use crate::research::{format_research, ResearchOrchestrator};
use crate::types::{SeoData, StrategyData};
use tracing::{error, info, warn};

/// Which stages run. Standard goes research, analysis, draft, polish;
/// Enhanced adds the strategy and SEO stages up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineVariant {
    Standard,
    Enhanced,
}

/// Sequences the generation stages for one topic. Strictly ordered and
/// non-branching: each stage's output feeds the next, no stage re-enters
/// a previous one.
pub struct BlogPipeline {
    config: GeneratorConfig,
    caller: ResilientCaller,
    research: ResearchOrchestrator,
    variant: PipelineVariant,
}

impl BlogPipeline {
    pub fn new(config: GeneratorConfig, caller: ResilientCaller, research: ResearchOrchestrator) -> Self {
        Self {
            config,
            caller,
            research,
            variant: PipelineVariant::Enhanced,
        }
    }

    pub fn with_variant(mut self, variant: PipelineVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Run the full pipeline. Returns the final article text, or `None`
    /// when the analysis or draft stage produced nothing.
    pub async fn generate(&self, topic: &str) -> Option<String> {
        info!("Starting blog generation: {}", topic);

        let strategy = match self.variant {
            PipelineVariant::Enhanced => Some(self.strategy_analysis(topic).await),
            PipelineVariant::Standard => None,
        };

        let record = self.research.conduct_research(topic).await;
        let research_summary = format_research(&record);

        let seo = match (&self.variant, &strategy) {
            (PipelineVariant::Enhanced, Some(strategy)) => {
                Some(self.seo_analysis(topic, strategy).await)
            }
            _ => None,
        };

        info!("Analyzing competitive intelligence...");
        let analysis = match self.caller.call(&analysis_prompt(topic, &research_summary)).await {
            Some(text) => text,
            None => {
                error!("Analysis failed");
                return None;
            }
        };

        info!("Writing blog post...");
        let draft_prompt = self.draft_prompt(topic, strategy.as_ref(), seo.as_ref(), &analysis, &research_summary);
        let draft = match self.caller.call(&draft_prompt).await {
            Some(text) => text,
            None => {
                error!("Blog writing failed");
                return None;
            }
        };

        info!("Final editing and optimization...");
        let polish_prompt = self.polish_prompt(topic, &draft, strategy.as_ref(), seo.as_ref());
        let final_content = match self.caller.call(&polish_prompt).await {
            Some(text) => text,
            None => {
                // The only stage where failure degrades instead of aborting
                warn!("Polish failed, using original content");
                draft
            }
        };

        info!("Blog generation complete");
        Some(final_content)
    }

    /// Strategy stage. Never fails the pipeline: degrades from parsed data
    /// through a parse fallback to an absent-response fallback, each tier
    /// structurally valid and topic-derived.
    pub async fn strategy_analysis(&self, topic: &str) -> StrategyData {
        info!("Strategy: analyzing topic and market positioning...");

        let agent = &self.config.agents.strategy;
        let prompt = strategy_prompt(topic, &agent.analysis_depth, agent.content_angle_generation);

        match self.caller.call(&prompt).await {
            Some(response) => match extract_json_object(&response) {
                JsonExtraction::Parsed(map) => {
                    let data = StrategyData::from_map(map);
                    if self.config.monitoring.show_research_summary {
                        info!(
                            "Strategy completed: {} unique angles identified",
                            data.content_angles().len()
                        );
                    }
                    data
                }
                JsonExtraction::FallbackNeeded(reason) => {
                    warn!("Strategy response unusable ({}), using structured fallback", reason);
                    StrategyData::parse_fallback(topic)
                }
            },
            None => {
                warn!("Strategy analysis failed, using basic strategy");
                StrategyData::absent_fallback(topic)
            }
        }
    }

    /// SEO stage, same three-tier contract as the strategy stage
    pub async fn seo_analysis(&self, topic: &str, strategy: &StrategyData) -> SeoData {
        info!("SEO: conducting keyword research and optimization analysis...");

        let agent = &self.config.agents.seo;
        let target_audience = strategy
            .primary_audience()
            .unwrap_or_else(|| "general audience".to_string());
        let angles = strategy.content_angles();
        let prompt = seo_prompt(
            topic,
            &target_audience,
            &angles,
            agent.primary_keywords,
            agent.secondary_keywords,
        );

        match self.caller.call(&prompt).await {
            Some(response) => match extract_json_object(&response) {
                JsonExtraction::Parsed(map) => {
                    let data = SeoData::from_map(map);
                    if self.config.monitoring.show_research_summary {
                        info!(
                            "SEO analysis completed: {} primary + {} secondary keywords",
                            data.primary_keywords().len(),
                            data.secondary_keywords().len()
                        );
                    }
                    data
                }
                JsonExtraction::FallbackNeeded(reason) => {
                    warn!("SEO response unusable ({}), using structured fallback", reason);
                    SeoData::parse_fallback(topic, &target_audience)
                }
            },
            None => {
                warn!("SEO analysis failed, using basic SEO strategy");
                SeoData::absent_fallback(topic)
            }
        }
    }

    fn draft_prompt(
        &self,
        topic: &str,
        strategy: Option<&StrategyData>,
        seo: Option<&SeoData>,
        analysis: &str,
        research_summary: &str,
    ) -> String {
        let blog = &self.config.blog;
        let audience = &blog.target_audience;

        let mut prompt = format!(
            "Write a {} blog post about \"{}\" ({}+ words) for {}.\n",
            blog.style, topic, blog.min_word_count, audience
        );

        if let Some(strategy) = strategy {
            let angle = strategy
                .content_angles()
                .into_iter()
                .next()
                .unwrap_or_else(|| format!("Complete guide to {topic}"));
            let target = strategy
                .primary_audience()
                .unwrap_or_else(|| audience.clone());
            let positioning = strategy
                .unique_value()
                .unwrap_or_else(|| "Expert insights".to_string());
            prompt.push_str(&format!(
                "\nSTRATEGIC DIRECTION:\n\
                 - Primary Content Angle: {angle}\n\
                 - Target Audience: {target}\n\
                 - Unique Positioning: {positioning}\n"
            ));
        }

        if let Some(seo) = seo {
            let title = seo
                .meta_title()
                .unwrap_or_else(|| format!("Complete Guide to {topic}"));
            let intent = seo
                .search_intent()
                .unwrap_or_else(|| "informational".to_string());
            prompt.push_str(&format!(
                "\nSEO OPTIMIZATION REQUIREMENTS:\n\
                 - Title: {}\n\
                 - Primary Keywords: {}\n\
                 - Secondary Keywords: {}\n\
                 - Content Structure: {}\n\
                 - Search Intent: {}\n",
                title,
                join_first(&seo.primary_keywords(), 3),
                join_first(&seo.secondary_keywords(), 5),
                content_structure_line(seo),
                intent
            ));
        }

        prompt.push_str(&format!("\nCOMPETITIVE ANALYSIS:\n{analysis}\n"));
        prompt.push_str(&format!(
            "\nRESEARCH DATA:\n{}...\n",
            leading_chars(research_summary, 1000)
        ));

        prompt.push_str(&format!(
            "\nCONTENT REQUIREMENTS:\n\
             - {} tone, data-driven content\n\
             - Target audience: {}\n\
             - Include latest trends and statistics\n\
             - Provide unique insights based on strategic angles\n\
             - Use SEO-optimized headings (H1, H2, H3)\n\
             - Naturally incorporate primary and secondary keywords\n\
             - Include actionable advice\n",
            title_case(&blog.style),
            audience
        ));
        if blog.include_sources {
            prompt.push_str("- Include source citations\n");
        }
        if blog.include_data {
            prompt.push_str("- Include data points and statistics\n");
        }
        prompt.push_str("- Structure according to SEO recommendations\n");
        if let Some(seo) = seo {
            let intent = seo
                .search_intent()
                .unwrap_or_else(|| "informational".to_string());
            prompt.push_str(&format!("- Write for {intent} search intent\n"));
        }

        prompt.push_str("\nWrite the complete SEO-optimized blog post:");
        prompt
    }

    fn polish_prompt(
        &self,
        topic: &str,
        draft: &str,
        strategy: Option<&StrategyData>,
        seo: Option<&SeoData>,
    ) -> String {
        let editor = &self.config.agents.editor;
        let audience = &self.config.blog.target_audience;

        let mut prompt = format!("Polish and optimize this blog post about \"{topic}\":\n\n{draft}\n");

        if let Some(strategy) = strategy {
            let angle = strategy
                .content_angles()
                .into_iter()
                .next()
                .unwrap_or_else(|| format!("Guide to {topic}"));
            let target = strategy
                .primary_audience()
                .unwrap_or_else(|| audience.clone());
            let positioning = strategy
                .unique_value()
                .unwrap_or_else(|| "Expert insights".to_string());
            prompt.push_str(&format!(
                "\nSTRATEGY ALIGNMENT CHECK:\n\
                 - Primary Content Angle: {angle}\n\
                 - Target Audience: {target}\n\
                 - Strategic Positioning: {positioning}\n"
            ));
        }

        if let Some(seo) = seo {
            let title = seo
                .meta_title()
                .unwrap_or_else(|| format!("Complete Guide to {topic}"));
            let description = seo
                .meta_description()
                .unwrap_or_else(|| format!("Complete guide to {topic}"));
            prompt.push_str(&format!(
                "\nSEO OPTIMIZATION VERIFICATION:\n\
                 - Title optimization: {}\n\
                 - Primary keywords: {}\n\
                 - Secondary keywords: {}\n\
                 - Content structure: {}\n\
                 - Meta description needed: {}\n",
                title,
                join_first(&seo.primary_keywords(), 3),
                join_first(&seo.secondary_keywords(), 5),
                content_structure_line(seo),
                description
            ));
        }

        prompt.push_str(
            "\nEDITING REQUIREMENTS:\n\
             - Improve readability and flow\n\
             - Ensure natural keyword integration (avoid keyword stuffing)\n\
             - Verify strategic angle is maintained throughout\n\
             - Add compelling introduction and conclusion\n\
             - Enhance competitive positioning based on analysis\n\
             - Check data accuracy and source credibility\n\
             - Optimize headings for SEO (H1, H2, H3 structure)\n",
        );
        if let Some(seo) = seo {
            let intent = seo
                .search_intent()
                .unwrap_or_else(|| "informational".to_string());
            prompt.push_str(&format!("- Ensure content matches search intent: {intent}\n"));
        }
        prompt.push_str("- Final quality and consistency check\n");
        if editor.keyword_density_check {
            prompt.push_str("- Verify keyword density is appropriate\n");
        }
        if editor.meta_description_generation {
            prompt.push_str("- Add meta description at the end\n");
        }

        prompt.push_str("\nReturn the final polished, SEO-optimized, and strategically-aligned blog post:");
        prompt
    }
}

fn strategy_prompt(topic: &str, analysis_depth: &str, angle_count: usize) -> String {
    format!(
        "As a Strategic Content Analyst, provide a {analysis_depth} analysis for the topic: \"{topic}\"\n\
         \n\
         STRATEGIC ANALYSIS REQUIRED:\n\
         \n\
         1. TARGET AUDIENCE ANALYSIS:\n\
            - Primary audience demographics and psychographics\n\
            - Pain points and challenges\n\
            - Content consumption preferences\n\
            - Decision-making factors\n\
         \n\
         2. COMPETITIVE LANDSCAPE:\n\
            - Key competitors in this space\n\
            - Content gaps in existing materials\n\
            - Competitive advantages to leverage\n\
            - Market positioning opportunities\n\
         \n\
         3. UNIQUE CONTENT ANGLES ({angle_count} angles):\n\
            - Generate {angle_count} distinct, compelling angles to approach this topic\n\
            - Each angle should differentiate from typical content\n\
            - Focus on untapped perspectives or emerging trends\n\
         \n\
         4. MARKET OPPORTUNITIES:\n\
            - Underserved audience segments\n\
            - Trending subtopics or related areas\n\
            - Seasonal or timely angles\n\
            - Cross-industry applications\n\
         \n\
         5. STRATEGIC POSITIONING:\n\
            - How to position this content uniquely\n\
            - Key messages to emphasize\n\
            - Tone and style recommendations\n\
            - Call-to-action strategies\n\
         \n\
         Provide specific, actionable insights in JSON format:\n\
         {{\n\
             \"target_audience\": {{\"primary\": \"...\", \"pain_points\": [\"...\", \"...\"], \"preferences\": \"...\"}},\n\
             \"competitive_landscape\": {{\"gaps\": [\"...\", \"...\"], \"opportunities\": [\"...\", \"...\"]}},\n\
             \"content_angles\": [\"angle1\", \"angle2\", \"angle3\"],\n\
             \"market_opportunities\": [\"opportunity1\", \"opportunity2\"],\n\
             \"strategic_positioning\": {{\"unique_value\": \"...\", \"key_messages\": [\"...\", \"...\"], \"tone\": \"...\"}}\n\
         }}"
    )
}

fn seo_prompt(
    topic: &str,
    target_audience: &str,
    content_angles: &[String],
    primary_count: usize,
    secondary_count: usize,
) -> String {
    let angles = join_first(content_angles, 3);
    format!(
        "As an SEO Specialist, conduct comprehensive keyword research and optimization strategy for: \"{topic}\"\n\
         \n\
         STRATEGIC CONTEXT:\n\
         - Target Audience: {target_audience}\n\
         - Content Angles: {angles}\n\
         \n\
         SEO ANALYSIS REQUIRED:\n\
         \n\
         1. PRIMARY KEYWORDS ({primary_count} keywords):\n\
            - High-volume, relevant keywords for \"{topic}\"\n\
            - Consider search intent and competition\n\
            - Focus on keywords the target audience would use\n\
         \n\
         2. SECONDARY KEYWORDS ({secondary_count} keywords):\n\
            - Long-tail variations and related terms\n\
            - LSI (Latent Semantic Indexing) keywords\n\
            - Question-based keywords people search for\n\
         \n\
         3. SEARCH INTENT ANALYSIS:\n\
            - What users are looking for when searching this topic\n\
            - Informational vs commercial vs navigational intent\n\
            - Content format preferences (how-to, lists, guides, etc.)\n\
         \n\
         4. CONTENT STRUCTURE:\n\
            - Recommended H1, H2, H3 structure for SEO\n\
            - Key sections to include\n\
            - Internal linking opportunities\n\
         \n\
         5. COMPETITOR ANALYSIS:\n\
            - What keywords competitors are likely targeting\n\
            - Content gaps to exploit\n\
            - Unique positioning opportunities\n\
         \n\
         6. META OPTIMIZATION:\n\
            - SEO-optimized title suggestions (50-60 characters)\n\
            - Meta description suggestions (150-160 characters)\n\
            - Featured snippet optimization tips\n\
         \n\
         Provide actionable SEO strategy in JSON format:\n\
         {{\n\
             \"primary_keywords\": [\"keyword1\", \"keyword2\", \"keyword3\"],\n\
             \"secondary_keywords\": [\"long-tail1\", \"long-tail2\", \"...\"],\n\
             \"search_intent\": \"informational/commercial/navigational\",\n\
             \"content_structure\": {{\"h1\": \"...\", \"h2_sections\": [\"...\", \"...\", \"...\"]}},\n\
             \"meta_optimization\": {{\"title\": \"...\", \"description\": \"...\", \"focus_keyword\": \"...\"}},\n\
             \"seo_recommendations\": [\"tip1\", \"tip2\", \"tip3\"]\n\
         }}"
    )
}

fn analysis_prompt(topic: &str, research_summary: &str) -> String {
    format!(
        "Analyze this research for \"{topic}\" and identify:\n\
         1. Key trends and opportunities\n\
         2. Competitive gaps\n\
         3. Unique angles to explore\n\
         \n\
         {research_summary}\n\
         \n\
         Keep analysis concise (max 300 words):"
    )
}

fn content_structure_line(seo: &SeoData) -> String {
    let sections = seo.h2_sections();
    if sections.is_empty() {
        "Introduction, Main Content, Conclusion".to_string()
    } else {
        sections.join(", ")
    }
}

fn join_first(items: &[String], count: usize) -> String {
    items
        .iter()
        .take(count)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

fn leading_chars(text: &str, count: usize) -> String {
    text.chars().take(count).collect()
}

fn title_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
