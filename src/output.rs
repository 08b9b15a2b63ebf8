use crate::types::Result;
use chrono::Local;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Fixed tag embedded in every output filename and metadata header
pub const SYSTEM_TAG: &str = "Competitive";

const DEFAULT_OUTPUT_DIR: &str = "output";

/// Persists a finished post to a timestamped markdown file. Written only
/// once a final content string exists; nothing is persisted on failure.
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    pub fn new() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write the post with its metadata header; returns the saved path
    pub fn save(&self, content: &str, topic: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let now = Local::now();
        let timestamp = now.format("%Y%m%d_%H%M%S");
        let filename = format!("{}_{}_{}.md", timestamp, SYSTEM_TAG, sanitize_topic(topic));
        let path = self.dir.join(filename);

        let header = format!(
            "# {}\n\
             *Generated: {}*\n\
             *System: Competitive Blog Generator*\n\
             *Features: Rate limiting, Error handling, Real-time research*\n\
             \n\
             ---\n\
             \n",
            topic,
            now.format("%Y-%m-%d %H:%M:%S"),
        );

        fs::write(&path, format!("{header}{content}"))?;
        info!("Saved blog post to {}", path.display());
        Ok(path)
    }
}

impl Default for OutputWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Clean a topic for use in a filename: keep alphanumerics, spaces,
/// hyphens and underscores, then turn spaces into underscores.
pub fn sanitize_topic(topic: &str) -> String {
    topic
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}
