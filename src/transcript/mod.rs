use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod file;
pub mod youtube;

pub use file::JsonFileSource;
pub use youtube::YoutubeCaptionSource;

/// One timed caption unit from the source video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Caption text
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    /// End time in seconds
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Ordered caption segments of a video, in presentation order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment texts joined by single spaces
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// End of the last segment in seconds
    pub fn duration(&self) -> Option<f64> {
        self.segments.last().map(TranscriptSegment::end)
    }
}

/// Why a transcript could not be produced. Any of these aborts an analysis.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceFailure {
    #[error("Transcripts are disabled for video ID: {video_id}")]
    Disabled { video_id: String },

    #[error("No transcript could be found for video ID: {video_id}")]
    NotFound { video_id: String },

    #[error("Transcript source unavailable for video ID {video_id}: {reason}")]
    Unavailable { video_id: String, reason: String },

    #[error("Transcript fetch cancelled for video ID: {video_id}")]
    Cancelled { video_id: String },

    #[error("Failed to fetch transcript for video ID {video_id}: {reason}")]
    Other { video_id: String, reason: String },
}

impl SourceFailure {
    pub fn video_id(&self) -> &str {
        match self {
            SourceFailure::Disabled { video_id }
            | SourceFailure::NotFound { video_id }
            | SourceFailure::Unavailable { video_id, .. }
            | SourceFailure::Cancelled { video_id }
            | SourceFailure::Other { video_id, .. } => video_id,
        }
    }
}

/// Produces the transcript of a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the ordered caption segments for a video
    async fn fetch(&self, video_id: &str) -> Result<Transcript, SourceFailure>;

    /// Short name used in logs
    fn source_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_text_joins_with_spaces_in_order() {
        let transcript = Transcript::new(vec![
            TranscriptSegment::new("The quick brown fox jumps.", 0.0, 2.5),
            TranscriptSegment::new("The fox runs fast.", 2.5, 2.0),
        ]);
        assert_eq!(
            transcript.full_text(),
            "The quick brown fox jumps. The fox runs fast."
        );
        assert_eq!(transcript.duration(), Some(4.5));
    }

    #[test]
    fn test_empty_transcript() {
        let transcript = Transcript::default();
        assert!(transcript.is_empty());
        assert_eq!(transcript.full_text(), "");
        assert_eq!(transcript.duration(), None);
    }

    #[test]
    fn test_deserializes_segment_list() {
        let json = r#"[{"text": "hello", "start": 0.5, "duration": 1.25}]"#;
        let transcript: Transcript = serde_json::from_str(json).unwrap();
        assert_eq!(transcript.segments()[0], TranscriptSegment::new("hello", 0.5, 1.25));
    }

    #[test]
    fn test_failure_carries_video_id() {
        let failure = SourceFailure::NotFound {
            video_id: "abc".to_string(),
        };
        assert_eq!(failure.video_id(), "abc");
        assert_eq!(
            failure.to_string(),
            "No transcript could be found for video ID: abc"
        );
    }
}
