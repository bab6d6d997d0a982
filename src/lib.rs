//! Tubescript - fetch a video's transcript, summarize it chunk by chunk and extract keywords
//!
//! The library is organised around a single analysis pipeline that drives a
//! transcript source, a summarizer and a keyword extractor. Every external
//! service sits behind a trait so it can be swapped for another provider or a
//! local model.

pub mod chunker;
pub mod cli;
pub mod config;
pub mod directory;
pub mod keywords;
pub mod output;
pub mod pipeline;
pub mod profile;
pub mod session;
pub mod summarize;
pub mod transcript;
pub mod translate;
pub mod utils;
pub mod wordcloud;

use serde::{Deserialize, Serialize};

pub use chunker::{chunk_text, BoundaryPolicy, Chunk};
pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use keywords::{Keyword, KeywordExtractor, KeywordSet};
pub use pipeline::{AnalysisPipeline, OutcomeStatus, PipelineOutcome, PipelineSettings, SummaryResult};
pub use profile::{InMemoryProfile, ProfileStore, SavedVideo};
pub use session::{Session, VideoReport};
pub use summarize::Summarizer;
pub use transcript::{SourceFailure, Transcript, TranscriptSegment, TranscriptSource};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the application layer
#[derive(thiserror::Error, Debug)]
pub enum TubescriptError {
    #[error("Please enter a valid YouTube video URL: {0}")]
    InvalidVideoUrl(String),

    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("File operation failed: {0}")]
    FileError(String),
}

/// Failure of an external text-processing capability (summarizer, keyword
/// extractor). These never abort an analysis; the pipeline records them.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CapabilityError {
    #[error("timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error("returned empty output")]
    EmptyOutput,

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("service error: {0}")]
    Service(String),

    #[error("cancelled")]
    Cancelled,
}

impl CapabilityError {
    /// Whether retrying the same call can reasonably succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, CapabilityError::Timeout { .. } | CapabilityError::Service(_))
    }
}
