//! Video metadata lookups: title and related videos.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::utils::watch_url;

/// Upper bound on one YouTube Data API request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Video found by a related-video search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedVideo {
    pub video_id: String,
    pub title: String,
}

impl RelatedVideo {
    pub fn url(&self) -> String {
        watch_url(&self.video_id)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DirectoryError {
    #[error("YouTube API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("YouTube API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

/// Looks up video metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoDirectory: Send + Sync {
    /// Title of a video, `None` if the video is unknown
    async fn video_title(&self, video_id: &str) -> Result<Option<String>, DirectoryError>;

    /// Videos matching a search query
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<RelatedVideo>, DirectoryError>;
}

/// YouTube Data API v3 client
pub struct YoutubeDataApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl YoutubeDataApi {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, "https://www.googleapis.com/youtube/v3")
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: http_client(REQUEST_TIMEOUT),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Give up on a request after `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    async fn get(&self, resource: &str, query: &[(&str, &str)]) -> Result<Value, DirectoryError> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, resource))
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl VideoDirectory for YoutubeDataApi {
    async fn video_title(&self, video_id: &str) -> Result<Option<String>, DirectoryError> {
        let body = self.get("videos", &[("part", "snippet"), ("id", video_id)]).await?;
        Ok(parse_video_title(&body))
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<RelatedVideo>, DirectoryError> {
        let max_results = max_results.to_string();
        let body = self
            .get(
                "search",
                &[
                    ("part", "snippet"),
                    ("type", "video"),
                    ("q", query),
                    ("maxResults", max_results.as_str()),
                ],
            )
            .await?;
        Ok(parse_search_results(&body))
    }
}

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

fn parse_video_title(body: &Value) -> Option<String> {
    body["items"]
        .as_array()?
        .first()?
        .pointer("/snippet/title")?
        .as_str()
        .map(str::to_string)
}

fn parse_search_results(body: &Value) -> Vec<RelatedVideo> {
    body["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(RelatedVideo {
                        video_id: item.pointer("/id/videoId")?.as_str()?.to_string(),
                        title: item.pointer("/snippet/title")?.as_str()?.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_video_title() {
        let body = json!({"items": [{"snippet": {"title": "Fox Facts"}}]});
        assert_eq!(parse_video_title(&body), Some("Fox Facts".to_string()));
        assert_eq!(parse_video_title(&json!({"items": []})), None);
    }

    #[test]
    fn test_parse_search_results_skips_non_videos() {
        let body = json!({"items": [
            {"id": {"videoId": "abc"}, "snippet": {"title": "Foxes"}},
            {"id": {"channelId": "xyz"}, "snippet": {"title": "Fox Channel"}}
        ]});
        let related = parse_search_results(&body);
        assert_eq!(
            related,
            vec![RelatedVideo {
                video_id: "abc".to_string(),
                title: "Foxes".to_string()
            }]
        );
        assert_eq!(related[0].url(), "https://www.youtube.com/watch?v=abc");
    }

    #[tokio::test]
    async fn test_unresponsive_api_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // accept and never answer
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });

        let api = YoutubeDataApi::with_base_url("key", format!("http://{}", addr))
            .with_timeout(Duration::from_millis(100));
        let result = tokio::time::timeout(Duration::from_secs(5), api.video_title("abc")).await;

        assert!(matches!(result, Ok(Err(DirectoryError::Http(_)))));
    }
}
