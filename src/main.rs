use blog_generator::config::DEFAULT_CONFIG_PATH;
use blog_generator::{
    BlogPipeline, DelayPolicy, GeneratorConfig, GeneratorError, GroqClient, OutputWriter,
    ResearchOrchestrator, ResilientCaller, SearchProvider, SerperClient, SleepDelayPolicy,
};
use clap::Parser;
use std::env;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "blog-generator", about = "Competitive blog post generator")]
struct Cli {
    /// Blog topic to write about
    topic: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(topic) = cli.topic else {
        print_usage();
        return Ok(());
    };

    let config = GeneratorConfig::load(Path::new(DEFAULT_CONFIG_PATH))?;

    let groq_key = match env::var("GROQ_API_KEY") {
        Ok(key) => key,
        Err(_) => {
            error!("GROQ_API_KEY not found in environment variables");
            print_troubleshooting();
            return Err(GeneratorError::MissingCredential("GROQ_API_KEY".to_string()).into());
        }
    };
    let serper_key = env::var("SERPER_API_KEY").ok();
    match &serper_key {
        Some(_) => info!("Serper API key found - competitive intelligence enabled"),
        None => warn!("SERPER_API_KEY not found. Using LLM knowledge only."),
    }
    if config.monitoring.verbose_progress {
        info!("Config loaded: {}", DEFAULT_CONFIG_PATH);
        info!(
            "Rate limiting: {}s LLM, {}s search",
            config.rate_limiting.llm_delay_seconds, config.rate_limiting.search_delay_seconds
        );
    }

    let delays: Arc<dyn DelayPolicy> = Arc::new(SleepDelayPolicy::from_config(&config.rate_limiting));
    let provider = Arc::new(GroqClient::new(groq_key, config.llm.clone()));
    let caller = ResilientCaller::new(provider, delays.clone(), config.rate_limiting.max_retries);
    let search: Arc<dyn SearchProvider> = Arc::new(SerperClient::new(serper_key, &config.search, delays));
    let research = ResearchOrchestrator::new(search, &config);
    let pipeline = BlogPipeline::new(config, caller, research);

    println!("Topic: {topic}");
    println!("Note: this may take a few minutes due to rate limiting");

    let result = tokio::select! {
        result = pipeline.generate(&topic) => result,
        _ = tokio::signal::ctrl_c() => {
            println!("\nGeneration interrupted by user");
            return Ok(());
        }
    };

    match result {
        Some(content) => {
            let path = OutputWriter::new().save(&content, &topic)?;
            println!("\nSUCCESS! Blog saved to: {}", path.display());
            println!("\nPreview:");
            println!("{}", "-".repeat(40));
            let preview: String = content.chars().take(400).collect();
            println!("{}...", preview.replace('\n', " "));
        }
        None => {
            println!("\nGeneration failed. Please check your API keys and try again.");
            print_troubleshooting();
        }
    }

    Ok(())
}

fn print_usage() {
    println!("Competitive Blog Generator");
    println!("Usage: blog-generator 'Your Topic'");
    println!();
    println!("Examples:");
    println!("  blog-generator 'Remote Work Trends'");
    println!("  blog-generator 'AI Tools for Business'");
}

fn print_troubleshooting() {
    println!("\nTroubleshooting:");
    println!("1. Check your GROQ_API_KEY in .env file");
    println!("2. Check your SERPER_API_KEY in .env file");
    println!("3. Ensure you have available API quota");
}
