use futures_util::{stream, StreamExt};
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use crate::chunker::{chunk_text, BoundaryPolicy, Chunk};
use crate::config::PipelineConfig;
use crate::keywords::{KeywordExtractor, KeywordSet};
use crate::summarize::Summarizer;
use crate::transcript::{SourceFailure, Transcript, TranscriptSource};
use crate::CapabilityError;

pub mod outcome;

pub use outcome::{OutcomeStatus, PipelineOutcome, SummaryResult};

/// Knobs for one analysis run
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_chunk_size: usize,
    pub boundary: BoundaryPolicy,
    pub concurrency: usize,
    pub summary_max_length: u32,
    pub summary_min_length: u32,
    pub retries: u32,
    pub retry_backoff: Duration,
    pub transcript_timeout: Duration,
    pub summarize_timeout: Duration,
    pub keyword_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

impl From<&PipelineConfig> for PipelineSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            max_chunk_size: config.max_chunk_size,
            boundary: config.boundary,
            concurrency: config.concurrency,
            summary_max_length: config.summary_max_length,
            summary_min_length: config.summary_min_length,
            retries: config.summarize_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            transcript_timeout: Duration::from_secs(config.transcript_timeout_secs),
            summarize_timeout: Duration::from_secs(config.summarize_timeout_secs),
            keyword_timeout: Duration::from_secs(config.keyword_timeout_secs),
        }
    }
}

/// Drives transcript source, chunker, summarizer and keyword extractor.
///
/// Only a transcript source failure aborts an analysis. Summarizer and
/// extractor failures are recorded in the returned [`PipelineOutcome`].
pub struct AnalysisPipeline {
    source: Arc<dyn TranscriptSource>,
    summarizer: Arc<dyn Summarizer>,
    extractor: Arc<dyn KeywordExtractor>,
    settings: PipelineSettings,
    progress: ProgressBar,
}

impl AnalysisPipeline {
    pub fn new(
        source: Arc<dyn TranscriptSource>,
        summarizer: Arc<dyn Summarizer>,
        extractor: Arc<dyn KeywordExtractor>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            summarizer,
            extractor,
            settings,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report chunk progress on the given bar
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Analyze one video.
    ///
    /// On cancellation the chunks not yet summarized are recorded as
    /// cancelled failures, keyword extraction is skipped and the outcome is
    /// flagged `cancelled` with status `PartialFailure`.
    pub async fn analyze(&self, video_id: &str, cancel: &CancellationToken) -> Result<PipelineOutcome, SourceFailure> {
        tracing::info!(video_id, source = self.source.source_name(), "Fetching transcript");
        self.progress.set_message("Fetching transcript...");
        let transcript = self.fetch_transcript(video_id, cancel).await?;

        let full_text = transcript.full_text();
        let segments = transcript.segments().to_vec();
        let chunks = chunk_text(&full_text, self.settings.max_chunk_size, self.settings.boundary);
        if chunks.is_empty() {
            tracing::info!(video_id, "Transcript is empty");
            return Ok(PipelineOutcome::empty(video_id, segments));
        }

        tracing::info!(
            video_id,
            chunks = chunks.len(),
            boundary = %self.settings.boundary,
            "Summarizing transcript"
        );
        self.progress.set_message("Summarizing transcript...");
        let summaries = self.summarize_chunks(&chunks, cancel).await;

        let cancelled = cancel.is_cancelled();
        let keywords = if cancelled {
            tracing::warn!(video_id, "Analysis cancelled, skipping keyword extraction");
            KeywordSet::new()
        } else {
            self.progress.set_message("Extracting keywords...");
            self.extract_keywords(&full_text).await
        };

        let outcome = PipelineOutcome::assemble(video_id, segments, full_text, summaries, keywords, cancelled);
        tracing::info!(
            video_id,
            status = %outcome.status,
            failed_chunks = outcome.failed_chunks().len(),
            keywords = outcome.keywords.len(),
            "Analysis finished"
        );

        Ok(outcome)
    }

    async fn fetch_transcript(&self, video_id: &str, cancel: &CancellationToken) -> Result<Transcript, SourceFailure> {
        let fetch = timeout(self.settings.transcript_timeout, self.source.fetch(video_id));

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SourceFailure::Cancelled {
                video_id: video_id.to_string(),
            }),
            result = fetch => match result {
                Ok(result) => result,
                Err(_) => Err(SourceFailure::Unavailable {
                    video_id: video_id.to_string(),
                    reason: format!("timed out after {}s", self.settings.transcript_timeout.as_secs_f64()),
                }),
            },
        }
    }

    /// Summarize every chunk; results come back in chunk order
    async fn summarize_chunks(&self, chunks: &[Chunk], cancel: &CancellationToken) -> Vec<SummaryResult> {
        self.progress.set_length(chunks.len() as u64);
        self.progress.set_position(0);

        stream::iter(chunks)
            .map(|chunk| self.summarize_chunk(chunk, cancel))
            .buffered(self.settings.concurrency.max(1))
            .inspect(|_| self.progress.inc(1))
            .collect()
            .await
    }

    async fn summarize_chunk(&self, chunk: &Chunk, cancel: &CancellationToken) -> SummaryResult {
        let mut attempt = 0;

        loop {
            if cancel.is_cancelled() {
                return SummaryResult::Failed {
                    chunk_index: chunk.index,
                    reason: CapabilityError::Cancelled,
                };
            }

            tracing::debug!(chunk = chunk.index, attempt, chars = chunk.len(), "Summarizing chunk");
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(CapabilityError::Cancelled),
                result = self.call_summarizer(&chunk.text) => result,
            };

            match result {
                Ok(text) => {
                    return SummaryResult::Success {
                        chunk_index: chunk.index,
                        text,
                    }
                }
                Err(err) if err.is_transient() && attempt < self.settings.retries => {
                    attempt += 1;
                    let backoff = self.settings.retry_backoff * attempt;
                    tracing::warn!(chunk = chunk.index, "Summarizer failed ({}), retrying in {:?}", err, backoff);

                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        _ = sleep(backoff) => {}
                    }
                }
                Err(err) => {
                    tracing::warn!(chunk = chunk.index, "Chunk summarization failed: {}", err);
                    return SummaryResult::Failed {
                        chunk_index: chunk.index,
                        reason: err,
                    };
                }
            }
        }
    }

    /// One bounded summarizer call; blank output counts as a failure
    async fn call_summarizer(&self, text: &str) -> Result<String, CapabilityError> {
        let call = self.summarizer.summarize(
            text,
            self.settings.summary_max_length,
            self.settings.summary_min_length,
        );

        let summary = timeout(self.settings.summarize_timeout, call)
            .await
            .map_err(|_| CapabilityError::Timeout {
                after_ms: self.settings.summarize_timeout.as_millis() as u64,
            })??;

        let summary = summary.trim();
        if summary.is_empty() {
            return Err(CapabilityError::EmptyOutput);
        }

        Ok(summary.to_string())
    }

    async fn extract_keywords(&self, full_text: &str) -> KeywordSet {
        match timeout(self.settings.keyword_timeout, self.extractor.extract(full_text)).await {
            Ok(Ok(keywords)) => keywords,
            Ok(Err(err)) => {
                tracing::warn!("Keyword extraction failed: {}", err);
                KeywordSet::new()
            }
            Err(_) => {
                tracing::warn!("Keyword extraction timed out after {:?}", self.settings.keyword_timeout);
                KeywordSet::new()
            }
        }
    }
}
