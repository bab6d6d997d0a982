use async_trait::async_trait;
use serde_json::Value;

use crate::CapabilityError;

pub mod huggingface;

pub use huggingface::HuggingFaceSummarizer;

/// Produces a shorter summary of a bounded piece of text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `text` into roughly `min_length..=max_length` tokens
    async fn summarize(&self, text: &str, max_length: u32, min_length: u32) -> Result<String, CapabilityError>;
}

/// Pull the summary out of a `[{"summary_text": ...}]` style response
pub(crate) fn parse_summary_response(response: &Value) -> Result<String, CapabilityError> {
    if let Some(error) = response.get("error").and_then(Value::as_str) {
        return Err(CapabilityError::Service(error.to_string()));
    }

    let first = response
        .as_array()
        .and_then(|items| items.first())
        .ok_or_else(|| CapabilityError::Malformed(format!("expected a list, got {}", response)))?;

    let text = first
        .get("summary_text")
        .and_then(Value::as_str)
        .ok_or_else(|| CapabilityError::Malformed(format!("missing summary_text in {}", first)))?;

    Ok(text.to_string())
}
