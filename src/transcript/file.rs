use async_trait::async_trait;
use std::path::PathBuf;

use super::{SourceFailure, Transcript, TranscriptSource};

/// Reads a transcript saved as a JSON list of `{text, start, duration}` objects
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TranscriptSource for JsonFileSource {
    async fn fetch(&self, video_id: &str) -> Result<Transcript, SourceFailure> {
        tracing::debug!("Reading transcript from {}", self.path.display());

        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceFailure::NotFound {
                    video_id: video_id.to_string(),
                });
            }
            Err(err) => {
                return Err(SourceFailure::Unavailable {
                    video_id: video_id.to_string(),
                    reason: format!("{}: {}", self.path.display(), err),
                });
            }
        };

        serde_json::from_str(&content).map_err(|err| SourceFailure::Other {
            video_id: video_id.to_string(),
            reason: format!("invalid transcript file {}: {}", self.path.display(), err),
        })
    }

    fn source_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_segments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.json");
        fs_err::write(
            &path,
            r#"[{"text": "a", "start": 0.0, "duration": 1.0}, {"text": "b", "start": 1.0, "duration": 1.0}]"#,
        )
        .unwrap();

        let transcript = JsonFileSource::new(&path).fetch("vid").await.unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.full_text(), "a b");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileSource::new(dir.path().join("missing.json"));
        let err = source.fetch("vid").await.unwrap_err();
        assert_eq!(
            err,
            SourceFailure::NotFound {
                video_id: "vid".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_json_is_other() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.json");
        fs_err::write(&path, "not json").unwrap();

        let err = JsonFileSource::new(&path).fetch("vid").await.unwrap_err();
        assert!(matches!(err, SourceFailure::Other { .. }));
    }
}
