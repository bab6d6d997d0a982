use serde::{Deserialize, Serialize};

use crate::keywords::KeywordSet;
use crate::transcript::TranscriptSegment;
use crate::CapabilityError;

/// Summarization result of one chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SummaryResult {
    Success { chunk_index: usize, text: String },
    Failed { chunk_index: usize, reason: CapabilityError },
}

impl SummaryResult {
    pub fn chunk_index(&self) -> usize {
        match self {
            SummaryResult::Success { chunk_index, .. } | SummaryResult::Failed { chunk_index, .. } => *chunk_index,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            SummaryResult::Success { text, .. } => Some(text),
            SummaryResult::Failed { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SummaryResult::Success { .. })
    }
}

/// Overall state of an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// At least one chunk was summarized
    Complete,
    /// No chunk was summarized, or the run was cancelled
    PartialFailure,
    /// The transcript had no text
    Empty,
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeStatus::Complete => write!(f, "complete"),
            OutcomeStatus::PartialFailure => write!(f, "partial failure"),
            OutcomeStatus::Empty => write!(f, "empty"),
        }
    }
}

/// Result of analyzing one video. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub video_id: String,
    pub full_text: String,
    pub segments: Vec<TranscriptSegment>,
    pub summaries: Vec<SummaryResult>,
    pub keywords: KeywordSet,
    pub status: OutcomeStatus,
    pub cancelled: bool,
}

impl PipelineOutcome {
    /// Outcome for a transcript without text
    pub fn empty(video_id: impl Into<String>, segments: Vec<TranscriptSegment>) -> Self {
        Self {
            video_id: video_id.into(),
            full_text: String::new(),
            segments,
            summaries: Vec::new(),
            keywords: KeywordSet::new(),
            status: OutcomeStatus::Empty,
            cancelled: false,
        }
    }

    /// Assemble an outcome from per-chunk results.
    ///
    /// `summaries` must hold exactly one entry per chunk, in chunk order.
    pub fn assemble(
        video_id: impl Into<String>,
        segments: Vec<TranscriptSegment>,
        full_text: String,
        summaries: Vec<SummaryResult>,
        keywords: KeywordSet,
        cancelled: bool,
    ) -> Self {
        if full_text.is_empty() {
            return Self::empty(video_id, segments);
        }

        let status = if !cancelled && summaries.iter().any(SummaryResult::is_success) {
            OutcomeStatus::Complete
        } else {
            OutcomeStatus::PartialFailure
        };

        Self {
            video_id: video_id.into(),
            full_text,
            segments,
            summaries,
            keywords,
            status,
            cancelled,
        }
    }

    /// Successful summaries in chunk order
    pub fn successful_summaries(&self) -> Vec<&str> {
        self.summaries.iter().filter_map(SummaryResult::text).collect()
    }

    /// Successful summaries joined by newlines, ready to copy
    pub fn summary_text(&self) -> String {
        self.successful_summaries().join("\n")
    }

    /// Indexes of chunks that could not be summarized
    pub fn failed_chunks(&self) -> Vec<usize> {
        self.summaries
            .iter()
            .filter(|summary| !summary.is_success())
            .map(SummaryResult::chunk_index)
            .collect()
    }

    /// Complete, but some chunks failed
    pub fn is_degraded(&self) -> bool {
        self.status == OutcomeStatus::Complete && !self.failed_chunks().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(i: usize) -> SummaryResult {
        SummaryResult::Success {
            chunk_index: i,
            text: format!("summary {}", i),
        }
    }

    fn failed(i: usize) -> SummaryResult {
        SummaryResult::Failed {
            chunk_index: i,
            reason: CapabilityError::EmptyOutput,
        }
    }

    fn assemble(summaries: Vec<SummaryResult>, cancelled: bool) -> PipelineOutcome {
        PipelineOutcome::assemble("vid", Vec::new(), "text".to_string(), summaries, KeywordSet::new(), cancelled)
    }

    #[test]
    fn test_one_success_is_complete() {
        let outcome = assemble(vec![failed(0), success(1), failed(2)], false);
        assert_eq!(outcome.status, OutcomeStatus::Complete);
        assert!(outcome.is_degraded());
        assert_eq!(outcome.failed_chunks(), vec![0, 2]);
        assert_eq!(outcome.summary_text(), "summary 1");
    }

    #[test]
    fn test_all_failed_is_partial_failure() {
        let outcome = assemble(vec![failed(0), failed(1)], false);
        assert_eq!(outcome.status, OutcomeStatus::PartialFailure);
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.summary_text(), "");
    }

    #[test]
    fn test_cancelled_is_partial_failure() {
        let outcome = assemble(vec![success(0), success(1)], true);
        assert_eq!(outcome.status, OutcomeStatus::PartialFailure);
        assert!(outcome.cancelled);
    }

    #[test]
    fn test_full_success_not_degraded() {
        let outcome = assemble(vec![success(0), success(1)], false);
        assert_eq!(outcome.status, OutcomeStatus::Complete);
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.summary_text(), "summary 0\nsummary 1");
    }

    #[test]
    fn test_serializes_status_tags() {
        let json = serde_json::to_value(failed(3)).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["chunk_index"], 3);
        assert_eq!(json["reason"]["kind"], "empty_output");
    }
}
