use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::chunker::BoundaryPolicy;

#[derive(Parser)]
#[command(
    name = "tubescript",
    about = "Tubescript - summarize YouTube videos from their transcripts",
    version,
    long_about = "Fetches the transcript of a YouTube video, splits it into chunks, summarizes each chunk and extracts keywords. Failed chunks are reported without aborting the analysis."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one or more videos in a single session
    Analyze {
        /// YouTube URLs or video ids, analyzed in order
        #[arg(value_name = "URL_OR_ID", required_unless_present = "transcript_file")]
        inputs: Vec<String>,

        /// Write reports to this file (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Report format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Maximum chunk size in characters
        #[arg(long, value_name = "N")]
        chunk_size: Option<usize>,

        /// Where chunks may end
        #[arg(long, value_enum)]
        boundary: Option<BoundaryPolicy>,

        /// Chunks summarized at the same time
        #[arg(long, value_name = "N")]
        concurrency: Option<usize>,

        /// Save the transcript, to `<videoId>_transcript.txt` unless a path is given
        #[arg(long, value_name = "FILE", num_args = 0..=1)]
        transcript_out: Option<Option<PathBuf>>,

        /// Read the transcript from a JSON file of segments instead of YouTube
        #[arg(long, value_name = "FILE")]
        transcript_file: Option<PathBuf>,

        /// Translate the transcript (languages set in config)
        #[arg(long)]
        translate: bool,

        /// Skip the title and related video lookup
        #[arg(long)]
        no_related: bool,
    },

    /// Show or edit settings
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text
    #[default]
    Text,
    /// JSON report
    Json,
    /// Markdown report
    Markdown,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}
