//! One user session: analyzes videos in turn and remembers them in a profile.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::directory::{RelatedVideo, VideoDirectory};
use crate::pipeline::{AnalysisPipeline, OutcomeStatus, PipelineOutcome};
use crate::profile::{ProfileStore, SavedVideo};
use crate::transcript::SourceFailure;

/// Everything shown for the video currently under analysis
#[derive(Debug, Clone, Serialize)]
pub struct VideoReport {
    pub video_id: String,
    pub title: Option<String>,
    pub outcome: PipelineOutcome,
    pub related: Vec<RelatedVideo>,
}

impl VideoReport {
    /// Title if known, otherwise the video id
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.video_id)
    }
}

/// Default bound on the title and related-video lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Session {
    id: Uuid,
    pipeline: AnalysisPipeline,
    directory: Option<Arc<dyn VideoDirectory>>,
    related_count: usize,
    lookup_timeout: Duration,
    profile: Box<dyn ProfileStore>,
    current: Option<Arc<VideoReport>>,
}

impl Session {
    pub fn new(pipeline: AnalysisPipeline, profile: Box<dyn ProfileStore>) -> Self {
        Self {
            id: Uuid::new_v4(),
            pipeline,
            directory: None,
            related_count: 0,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            profile,
            current: None,
        }
    }

    /// Look up titles and up to `related_count` related videos
    pub fn with_directory(mut self, directory: Arc<dyn VideoDirectory>, related_count: usize) -> Self {
        self.directory = Some(directory);
        self.related_count = related_count;
        self
    }

    pub fn with_lookup_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Analyze a new video, replacing the current report.
    ///
    /// The previous report is dropped before the analysis starts, so a failed
    /// submission leaves no current report. Only a `Complete` run that was not
    /// cancelled is saved to the profile. The directory lookup gives up when
    /// `cancel` fires or the lookup timeout passes.
    pub async fn submit(
        &mut self,
        video_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Arc<VideoReport>, SourceFailure> {
        self.current = None;
        tracing::info!(session = %self.id, "Submitting video {}", video_id);

        let outcome = self.pipeline.analyze(video_id, cancel).await?;

        let (title, related) = if outcome.cancelled {
            (None, Vec::new())
        } else {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::warn!("Directory lookup for {} cancelled", video_id);
                    (None, Vec::new())
                }
                lookup = timeout(self.lookup_timeout, self.lookup(video_id)) => lookup.unwrap_or_else(|_| {
                    tracing::warn!("Directory lookup for {} timed out after {:?}", video_id, self.lookup_timeout);
                    (None, Vec::new())
                }),
            }
        };

        let report = Arc::new(VideoReport {
            video_id: video_id.to_string(),
            title,
            outcome,
            related,
        });

        let saveable = report.outcome.status == OutcomeStatus::Complete
            && !report.outcome.cancelled
            && !cancel.is_cancelled();
        if saveable {
            let summaries = report
                .outcome
                .successful_summaries()
                .into_iter()
                .map(str::to_string)
                .collect();
            self.profile
                .save(SavedVideo::new(video_id, report.display_title(), summaries));
        }

        self.current = Some(Arc::clone(&report));
        Ok(report)
    }

    /// Title and related videos; lookup failures degrade to nothing
    async fn lookup(&self, video_id: &str) -> (Option<String>, Vec<RelatedVideo>) {
        let Some(directory) = &self.directory else {
            return (None, Vec::new());
        };

        let title = match directory.video_title(video_id).await {
            Ok(title) => title,
            Err(e) => {
                tracing::warn!("Title lookup failed for {}: {}", video_id, e);
                None
            }
        };

        let related = match &title {
            Some(title) if self.related_count > 0 => {
                match directory.search(title, self.related_count + 1).await {
                    Ok(videos) => videos
                        .into_iter()
                        .filter(|video| video.video_id != video_id)
                        .take(self.related_count)
                        .collect(),
                    Err(e) => {
                        tracing::warn!("Related video search failed: {}", e);
                        Vec::new()
                    }
                }
            }
            _ => Vec::new(),
        };

        (title, related)
    }

    /// Report for the most recent successful submission
    pub fn current(&self) -> Option<&Arc<VideoReport>> {
        self.current.as_ref()
    }

    pub fn profile(&self) -> &dyn ProfileStore {
        self.profile.as_ref()
    }

    pub fn profile_mut(&mut self) -> &mut dyn ProfileStore {
        self.profile.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{DirectoryError, MockVideoDirectory};
    use crate::keywords::{KeywordCase, StopWordExtractor};
    use crate::pipeline::PipelineSettings;
    use crate::profile::InMemoryProfile;
    use crate::summarize::MockSummarizer;
    use crate::transcript::{MockTranscriptSource, Transcript, TranscriptSegment};

    fn pipeline() -> AnalysisPipeline {
        let mut summarizer = MockSummarizer::new();
        summarizer
            .expect_summarize()
            .returning(|text, _, _| Ok(format!("summary: {}", text)));
        pipeline_with(summarizer)
    }

    fn pipeline_with(summarizer: MockSummarizer) -> AnalysisPipeline {
        let mut source = MockTranscriptSource::new();
        source.expect_fetch().returning(|video_id| match video_id {
            "missing" => Err(SourceFailure::NotFound {
                video_id: video_id.to_string(),
            }),
            "silent" => Ok(Transcript::new(Vec::new())),
            _ => Ok(Transcript::new(vec![TranscriptSegment::new(
                format!("Transcript of {}", video_id),
                0.0,
                2.0,
            )])),
        });
        source.expect_source_name().return_const("mock");

        AnalysisPipeline::new(
            Arc::new(source),
            Arc::new(summarizer),
            Arc::new(StopWordExtractor::new(KeywordCase::Preserve)),
            PipelineSettings::default(),
        )
    }

    fn directory() -> MockVideoDirectory {
        let mut directory = MockVideoDirectory::new();
        directory
            .expect_video_title()
            .returning(|video_id| Ok(Some(format!("Title {}", video_id))));
        directory.expect_search().returning(|query, _| {
            Ok(vec![
                RelatedVideo {
                    video_id: "first".to_string(),
                    title: query.to_string(),
                },
                RelatedVideo {
                    video_id: "other".to_string(),
                    title: "Other".to_string(),
                },
            ])
        });
        directory
    }

    #[tokio::test]
    async fn test_submit_saves_to_profile() {
        let mut session = Session::new(pipeline(), Box::new(InMemoryProfile::default()))
            .with_directory(Arc::new(directory()), 5);

        let report = session.submit("first", &CancellationToken::new()).await.unwrap();
        assert_eq!(report.outcome.status, OutcomeStatus::Complete);
        assert_eq!(report.display_title(), "Title first");
        // the video itself is not listed as related
        assert_eq!(report.related.len(), 1);
        assert_eq!(report.related[0].video_id, "other");

        let saved = session.profile().list();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].title, "Title first");
        assert_eq!(saved[0].summaries, vec!["summary: Transcript of first"]);
    }

    #[tokio::test]
    async fn test_new_submission_replaces_current() {
        let mut session = Session::new(pipeline(), Box::new(InMemoryProfile::default()));
        let cancel = CancellationToken::new();

        session.submit("first", &cancel).await.unwrap();
        session.submit("second", &cancel).await.unwrap();
        assert_eq!(session.current().unwrap().video_id, "second");
        assert_eq!(session.profile().list().len(), 2);

        assert!(session.submit("missing", &cancel).await.is_err());
        assert!(session.current().is_none());
        assert_eq!(session.profile().list().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_transcript_is_not_saved() {
        let mut session = Session::new(pipeline(), Box::new(InMemoryProfile::default()));
        let report = session.submit("silent", &CancellationToken::new()).await.unwrap();

        assert_eq!(report.outcome.status, OutcomeStatus::Empty);
        assert!(session.profile().list().is_empty());
    }

    #[tokio::test]
    async fn test_directory_failure_falls_back_to_id() {
        let mut directory = MockVideoDirectory::new();
        directory.expect_video_title().returning(|_| {
            Err(DirectoryError::Status {
                status: 403,
                message: "quota".to_string(),
            })
        });
        directory.expect_search().never();

        let mut session = Session::new(pipeline(), Box::new(InMemoryProfile::default()))
            .with_directory(Arc::new(directory), 5);
        let report = session.submit("abc", &CancellationToken::new()).await.unwrap();

        assert_eq!(report.title, None);
        assert!(report.related.is_empty());
        assert_eq!(session.profile().list()[0].title, "abc");
    }

    #[tokio::test]
    async fn test_cancelled_run_is_not_saved() {
        let mut session = Session::new(pipeline(), Box::new(InMemoryProfile::default()));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = session.submit("first", &cancel).await;
        assert!(matches!(result, Err(SourceFailure::Cancelled { .. })));
        assert!(session.profile().list().is_empty());
    }

    #[tokio::test]
    async fn test_run_with_no_summaries_is_not_saved() {
        let mut summarizer = MockSummarizer::new();
        summarizer.expect_summarize().returning(|_, _, _| Ok("   ".to_string()));

        let mut session = Session::new(pipeline_with(summarizer), Box::new(InMemoryProfile::default()));
        let report = session.submit("abc", &CancellationToken::new()).await.unwrap();

        assert_eq!(report.outcome.status, OutcomeStatus::PartialFailure);
        assert!(!report.outcome.cancelled);
        assert!(session.profile().list().is_empty());
        assert_eq!(session.current().unwrap().video_id, "abc");
    }

    /// Directory whose calls never finish
    struct StalledDirectory;

    #[async_trait::async_trait]
    impl VideoDirectory for StalledDirectory {
        async fn video_title(&self, _: &str) -> Result<Option<String>, DirectoryError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(None)
        }

        async fn search(&self, _: &str, _: usize) -> Result<Vec<RelatedVideo>, DirectoryError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_cancel_interrupts_directory_lookup() {
        let mut session = Session::new(pipeline(), Box::new(InMemoryProfile::default()))
            .with_directory(Arc::new(StalledDirectory), 5);

        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let report = tokio::time::timeout(Duration::from_secs(2), session.submit("abc", &cancel))
            .await
            .expect("submit should return once cancelled")
            .unwrap();

        assert_eq!(report.title, None);
        assert!(report.related.is_empty());
        assert!(session.profile().list().is_empty());
    }

    #[tokio::test]
    async fn test_slow_directory_lookup_times_out() {
        let mut session = Session::new(pipeline(), Box::new(InMemoryProfile::default()))
            .with_directory(Arc::new(StalledDirectory), 5)
            .with_lookup_timeout(Duration::from_millis(50));

        let report = tokio::time::timeout(Duration::from_secs(2), session.submit("abc", &CancellationToken::new()))
            .await
            .expect("lookup should time out")
            .unwrap();

        assert_eq!(report.display_title(), "abc");
        assert_eq!(session.profile().list()[0].title, "abc");
    }
}
