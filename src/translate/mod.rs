use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::chunker::{chunk_text, BoundaryPolicy};

/// Longest piece sent to the translation endpoint in one request
pub const MAX_TRANSLATE_CHARS: usize = 4500;

/// Upper bound on one translation request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(thiserror::Error, Debug)]
pub enum TranslateError {
    #[error("Translation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Translation service returned HTTP {0}")]
    Status(u16),

    #[error("Unexpected translation response")]
    Malformed,

    #[error("Translation cancelled")]
    Cancelled,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslateError>;
}

/// Client for the public Google Translate endpoint
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: http_client(REQUEST_TIMEOUT),
            endpoint: endpoint.into(),
        }
    }

    /// Give up on a request after `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }
}

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslateError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("client", "gtx"), ("sl", source), ("tl", target), ("dt", "t"), ("q", text)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TranslateError::Status(response.status().as_u16()));
        }

        let body: Value = response.json().await?;
        parse_translation(&body).ok_or(TranslateError::Malformed)
    }
}

/// Concatenate the translated sentences of a `[[["text", "source", ...], ...], ...]` response
fn parse_translation(body: &Value) -> Option<String> {
    let sentences = body.get(0)?.as_array()?;
    Some(
        sentences
            .iter()
            .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
            .collect(),
    )
}

/// Translate text of any length, piece by piece at sentence boundaries.
///
/// Stops with `Cancelled` as soon as `cancel` fires, even mid-request.
pub async fn translate_long(
    translator: &dyn Translator,
    text: &str,
    source: &str,
    target: &str,
    cancel: &CancellationToken,
) -> Result<String, TranslateError> {
    let pieces = chunk_text(text, MAX_TRANSLATE_CHARS, BoundaryPolicy::Sentence);
    tracing::debug!("Translating {} pieces {} -> {}", pieces.len(), source, target);

    let mut translated = Vec::with_capacity(pieces.len());
    for piece in &pieces {
        let piece = piece.text.trim();
        if piece.is_empty() {
            continue;
        }
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TranslateError::Cancelled),
            result = translator.translate(piece, source, target) => result,
        };
        translated.push(result?);
    }

    Ok(translated.join(" "))
}
