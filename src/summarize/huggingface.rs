use async_trait::async_trait;
use serde_json::Value;

use super::{parse_summary_response, Summarizer};
use crate::config::ServicesConfig;
use crate::CapabilityError;

/// Summarizer backed by the Hugging Face inference API
pub struct HuggingFaceSummarizer {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HuggingFaceSummarizer {
    pub fn new(endpoint: impl Into<String>, api_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_token,
        }
    }

    /// Build from configuration, reading the token from the configured env var
    pub fn from_config(services: &ServicesConfig) -> Self {
        let api_token = std::env::var(&services.summarizer_token_env).ok();
        if api_token.is_none() {
            tracing::warn!(
                "{} is not set, calling the summarizer without authentication",
                services.summarizer_token_env
            );
        }
        Self::new(services.summarizer_endpoint(), api_token)
    }
}

#[async_trait]
impl Summarizer for HuggingFaceSummarizer {
    async fn summarize(&self, text: &str, max_length: u32, min_length: u32) -> Result<String, CapabilityError> {
        let mut request = self.client.post(&self.endpoint).json(&serde_json::json!({
            "inputs": text,
            "parameters": {
                "max_length": max_length,
                "min_length": min_length,
                "do_sample": false,
            },
        }));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| CapabilityError::Service(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| CapabilityError::Service(err.to_string()))?;

        if !status.is_success() {
            // the inference API reports loading models and rate limits as {"error": ..}
            return match serde_json::from_str::<Value>(&body) {
                Ok(value) if value.get("error").is_some() => parse_summary_response(&value),
                _ => Err(CapabilityError::Service(format!("HTTP {}: {}", status, body.trim()))),
            };
        }

        let body: Value = serde_json::from_str(&body).map_err(|err| CapabilityError::Malformed(err.to_string()))?;
        parse_summary_response(&body)
    }
}
