use blog_generator::config::GeneratorConfig;
use blog_generator::output::{sanitize_topic, OutputWriter, SYSTEM_TAG};
use std::fs;
use std::path::Path;

#[test]
fn sanitization_keeps_only_safe_filename_characters() {
    let safe = sanitize_topic("AI & Machine-Learning: 2024!");

    assert_eq!(safe, "AI__Machine-Learning_2024");
    assert!(safe
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-'));
}

#[test]
fn saved_posts_get_timestamped_names_and_metadata_headers() {
    let dir = tempfile::tempdir().unwrap();
    let writer = OutputWriter::with_dir(dir.path());

    let path = writer.save("Body text", "Remote Work Trends").unwrap();

    let name = path.file_name().unwrap().to_str().unwrap();
    let expected_suffix = format!("_{}_Remote_Work_Trends.md", SYSTEM_TAG);
    assert!(name.ends_with(&expected_suffix), "unexpected filename: {name}");

    // YYYYMMDD_HHMMSS prefix
    let timestamp = &name[..15];
    assert!(timestamp[..8].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(&timestamp[8..9], "_");
    assert!(timestamp[9..15].chars().all(|c| c.is_ascii_digit()));

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("# Remote Work Trends\n"));
    assert!(written.contains("*System: Competitive Blog Generator*"));
    assert!(written.contains("---\n\n"));
    assert!(written.ends_with("Body text"));
}

#[test]
fn default_config_matches_documented_values() {
    let config = GeneratorConfig::default();

    assert_eq!(config.llm.model, "llama-3.1-8b-instant");
    assert_eq!(config.llm.max_tokens, 1500);
    assert_eq!(config.blog.min_word_count, 1500);
    assert_eq!(config.blog.style, "professional");
    assert_eq!(config.rate_limiting.max_retries, 3);
    assert_eq!(config.search.category_counts(), [3, 3, 2, 2]);
    assert_eq!(config.search.news_results, 2);
    assert_eq!(config.agents.research.focus_areas.len(), 4);
    assert!(!config.agents.editor.keyword_density_check);
}

#[test]
fn partial_yaml_fills_missing_fields_from_defaults() {
    let config = GeneratorConfig::from_yaml(
        "llm:\n  model: mixtral-8x7b-32768\nblog:\n  min_word_count: 800\n",
    )
    .unwrap();

    assert_eq!(config.llm.model, "mixtral-8x7b-32768");
    assert_eq!(config.llm.temperature, 0.7);
    assert_eq!(config.blog.min_word_count, 800);
    assert_eq!(config.blog.style, "professional");
    assert_eq!(config.search.max_results, 5);
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let config = GeneratorConfig::load(Path::new("/nonexistent/blog_config.yaml")).unwrap();
    assert_eq!(config.rate_limiting.max_retries, 3);
}

#[test]
fn invalid_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blog_config.yaml");
    fs::write(&path, "llm: [not, a, mapping").unwrap();

    assert!(GeneratorConfig::load(&path).is_err());
}
