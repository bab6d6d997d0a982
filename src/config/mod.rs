use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::chunker::{BoundaryPolicy, DEFAULT_MAX_CHUNK_SIZE};
use crate::cli::OutputFormat;
use crate::keywords::KeywordCase;
use crate::TubescriptError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Analysis pipeline settings
    pub pipeline: PipelineConfig,

    /// External services
    pub services: ServicesConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum chunk size in characters
    pub max_chunk_size: usize,

    /// Where chunks may end
    pub boundary: BoundaryPolicy,

    /// Chunks summarized at the same time
    pub concurrency: usize,

    /// Summary length bounds passed to the summarizer
    pub summary_max_length: u32,
    pub summary_min_length: u32,

    /// Extra attempts for a chunk after a transient failure
    pub summarize_retries: u32,
    pub retry_backoff_ms: u64,

    pub transcript_timeout_secs: u64,
    pub summarize_timeout_secs: u64,
    pub keyword_timeout_secs: u64,

    /// Case policy for extracted keywords
    pub keyword_case: KeywordCase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Hugging Face inference API base URL
    pub summarizer_api_url: String,

    /// Summarization model
    pub summarizer_model: String,

    /// Env var holding the Hugging Face token
    pub summarizer_token_env: String,

    /// Env var holding the YouTube Data API key
    pub youtube_api_key_env: String,

    /// Caption languages, in order of preference
    pub caption_languages: Vec<String>,

    /// Translation endpoint
    pub translate_api_url: String,
    pub translate_source: String,
    pub translate_target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Name shown on the session profile
    pub profile_name: String,

    /// Default output format
    pub default_output_format: OutputFormat,

    /// Related videos listed per report
    pub related_videos: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            boundary: BoundaryPolicy::Character,
            concurrency: 1,
            summary_max_length: 150,
            summary_min_length: 30,
            summarize_retries: 1,
            retry_backoff_ms: 500,
            transcript_timeout_secs: 60,
            summarize_timeout_secs: 120,
            keyword_timeout_secs: 30,
            keyword_case: KeywordCase::Preserve,
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            summarizer_api_url: "https://api-inference.huggingface.co/models".to_string(),
            summarizer_model: "sshleifer/distilbart-cnn-12-6".to_string(),
            summarizer_token_env: "HF_API_TOKEN".to_string(),
            youtube_api_key_env: "YOUTUBE_API_KEY".to_string(),
            caption_languages: vec!["en".to_string()],
            translate_api_url: "https://translate.googleapis.com/translate_a/single".to_string(),
            translate_source: "en".to_string(),
            translate_target: "hi".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile_name: "Guest".to_string(),
            default_output_format: OutputFormat::Text,
            related_videos: 5,
        }
    }
}

impl ServicesConfig {
    /// Full URL of the summarization model
    pub fn summarizer_endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.summarizer_api_url.trim_end_matches('/'),
            self.summarizer_model
        )
    }

    /// YouTube Data API key, if the configured env var is set
    pub fn youtube_api_key(&self) -> Option<String> {
        std::env::var(&self.youtube_api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load and validate a configuration file
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("tubescript").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let pipeline = &self.pipeline;

        if pipeline.max_chunk_size == 0 {
            return Err(TubescriptError::InvalidConfig("max_chunk_size must be at least 1".into()).into());
        }
        if pipeline.concurrency == 0 {
            return Err(TubescriptError::InvalidConfig("concurrency must be at least 1".into()).into());
        }
        if pipeline.summary_min_length > pipeline.summary_max_length {
            return Err(TubescriptError::InvalidConfig(format!(
                "summary_min_length ({}) exceeds summary_max_length ({})",
                pipeline.summary_min_length, pipeline.summary_max_length
            ))
            .into());
        }
        for (name, secs) in [
            ("transcript_timeout_secs", pipeline.transcript_timeout_secs),
            ("summarize_timeout_secs", pipeline.summarize_timeout_secs),
            ("keyword_timeout_secs", pipeline.keyword_timeout_secs),
        ] {
            if secs == 0 {
                return Err(TubescriptError::InvalidConfig(format!("{} must be at least 1", name)).into());
            }
        }
        if self.services.caption_languages.is_empty() {
            return Err(TubescriptError::InvalidConfig("caption_languages must not be empty".into()).into());
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Chunk Size: {} ({})", self.pipeline.max_chunk_size, self.pipeline.boundary);
        println!("  Concurrency: {}", self.pipeline.concurrency);
        println!(
            "  Summary Length: {}-{}",
            self.pipeline.summary_min_length, self.pipeline.summary_max_length
        );
        println!("  Summarizer: {}", self.services.summarizer_endpoint());
        println!("  Caption Languages: {}", self.services.caption_languages.join(", "));
        println!(
            "  Translation: {} -> {}",
            self.services.translate_source, self.services.translate_target
        );
        println!("  Profile: {}", self.app.profile_name);
        println!("  Default Format: {}", self.app.default_output_format);
    }

    /// Point the user at the config file
    pub async fn interactive_setup(&self) -> Result<()> {
        println!("Edit the config file to change settings:");
        println!("  {}", Self::config_path()?.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs_err::write(
            &path,
            "pipeline:\n  max_chunk_size: 500\n  boundary: word\nservices: {}\napp: {}\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.pipeline.max_chunk_size, 500);
        assert_eq!(config.pipeline.boundary, BoundaryPolicy::Word);
        assert_eq!(config.pipeline.summary_max_length, 150);
        assert_eq!(config.app.profile_name, "Guest");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let mut config = Config::default();
        config.pipeline.concurrency = 4;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let mut config = Config::default();
        config.pipeline.max_chunk_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pipeline.summary_min_length = 200;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_timeouts() {
        let mut config = Config::default();
        config.pipeline.transcript_timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("transcript_timeout_secs"));

        let mut config = Config::default();
        config.pipeline.summarize_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pipeline.keyword_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_summarizer_endpoint() {
        let mut services = ServicesConfig::default();
        services.summarizer_api_url = "http://localhost:8080/models/".to_string();
        services.summarizer_model = "bart".to_string();
        assert_eq!(services.summarizer_endpoint(), "http://localhost:8080/models/bart");
    }
}
