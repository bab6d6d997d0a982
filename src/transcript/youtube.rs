use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::process::Stdio;
use tokio::process::Command;

use super::{SourceFailure, Transcript, TranscriptSegment, TranscriptSource};
use crate::utils::watch_url;

/// YouTube caption fetcher.
///
/// Uses yt-dlp to list the caption tracks of a video, then downloads the
/// json3 rendition of the best matching track over HTTP.
pub struct YoutubeCaptionSource {
    yt_dlp_path: String,
    languages: Vec<String>,
    client: reqwest::Client,
}

/// json3 caption track as served by YouTube
#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(default)]
    events: Vec<CaptionEvent>,
}

#[derive(Debug, Deserialize)]
struct CaptionEvent {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(rename = "dDurationMs", default)]
    duration_ms: u64,
    #[serde(default)]
    segs: Vec<CaptionSeg>,
}

#[derive(Debug, Deserialize)]
struct CaptionSeg {
    #[serde(default)]
    utf8: String,
}

impl YoutubeCaptionSource {
    /// `languages` are tried in order, manual captions before generated ones
    pub fn new(languages: Vec<String>) -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            languages,
            client: reqwest::Client::new(),
        }
    }

    /// Use a yt-dlp binary other than the one on `PATH`
    pub fn with_yt_dlp_path(mut self, path: impl Into<String>) -> Self {
        self.yt_dlp_path = path.into();
        self
    }

    /// Get video information using yt-dlp
    ///
    /// The child is killed if the returned future is dropped, so a timed out
    /// or cancelled fetch does not leave yt-dlp running.
    async fn get_video_info(&self, video_id: &str) -> Result<Value, SourceFailure> {
        let url = watch_url(video_id);
        tracing::debug!("Listing caption tracks for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--skip-download", "--no-playlist", &url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| SourceFailure::Unavailable {
                video_id: video_id.to_string(),
                reason: format!("yt-dlp is not available ({}). Please install it: https://github.com/yt-dlp/yt-dlp", err),
            })?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(classify_yt_dlp_error(video_id, &error));
        }

        serde_json::from_slice(&output.stdout).map_err(|err| SourceFailure::Other {
            video_id: video_id.to_string(),
            reason: format!("could not parse yt-dlp output: {}", err),
        })
    }

    async fn download_track(&self, video_id: &str, url: &str) -> Result<Transcript, SourceFailure> {
        let unavailable = |reason: String| SourceFailure::Unavailable {
            video_id: video_id.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| unavailable(format!("caption download failed: {}", err)))?;

        if !response.status().is_success() {
            return Err(unavailable(format!(
                "caption download failed: HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|err| unavailable(format!("caption download failed: {}", err)))?;

        parse_caption_track(&body).map_err(|err| SourceFailure::Other {
            video_id: video_id.to_string(),
            reason: format!("malformed caption track: {}", err),
        })
    }
}

#[async_trait]
impl TranscriptSource for YoutubeCaptionSource {
    async fn fetch(&self, video_id: &str) -> Result<Transcript, SourceFailure> {
        let info = self.get_video_info(video_id).await?;
        let track_url = select_caption_track(&info, &self.languages, video_id)?;
        let transcript = self.download_track(video_id, &track_url).await?;

        tracing::debug!("Fetched {} caption segments for {}", transcript.len(), video_id);
        Ok(transcript)
    }

    fn source_name(&self) -> &'static str {
        "youtube"
    }
}

/// Map yt-dlp stderr to a typed failure
fn classify_yt_dlp_error(video_id: &str, stderr: &str) -> SourceFailure {
    let lower = stderr.to_lowercase();
    let unavailable = ["video unavailable", "private video", "this video is not available", "unable to download"];

    if unavailable.iter().any(|needle| lower.contains(needle)) {
        SourceFailure::Unavailable {
            video_id: video_id.to_string(),
            reason: stderr.trim().to_string(),
        }
    } else {
        SourceFailure::Other {
            video_id: video_id.to_string(),
            reason: format!("yt-dlp failed: {}", stderr.trim()),
        }
    }
}

/// Pick the json3 URL of the first caption track matching `languages`.
///
/// Manually created tracks win over automatic ones. A video with no tracks
/// at all has captions disabled.
fn select_caption_track(info: &Value, languages: &[String], video_id: &str) -> Result<String, SourceFailure> {
    let manual = info.get("subtitles").and_then(Value::as_object);
    let automatic = info.get("automatic_captions").and_then(Value::as_object);

    let has_tracks = [manual, automatic]
        .iter()
        .flatten()
        .any(|tracks| !tracks.is_empty());
    if !has_tracks {
        return Err(SourceFailure::Disabled {
            video_id: video_id.to_string(),
        });
    }

    for tracks in [manual, automatic].into_iter().flatten() {
        for language in languages {
            let url = tracks
                .get(language)
                .and_then(Value::as_array)
                .and_then(|formats| formats.iter().find(|format| format["ext"] == "json3"))
                .and_then(|format| format["url"].as_str());

            if let Some(url) = url {
                tracing::debug!("Using caption track '{}' for {}", language, video_id);
                return Ok(url.to_string());
            }
        }
    }

    Err(SourceFailure::NotFound {
        video_id: video_id.to_string(),
    })
}

/// Convert a json3 caption track into transcript segments
fn parse_caption_track(body: &str) -> Result<Transcript, serde_json::Error> {
    let track: CaptionTrack = serde_json::from_str(body)?;

    let segments = track
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|seg| seg.utf8.as_str()).collect();
            let text = text.replace('\n', " ").trim().to_string();
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment {
                text,
                start: event.start_ms as f64 / 1000.0,
                duration: event.duration_ms as f64 / 1000.0,
            })
        })
        .collect();

    Ok(Transcript::new(segments))
}
