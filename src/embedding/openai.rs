use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{EmbeddingBatch, EmbeddingProvider, Usage};
use crate::error::ProxyError;

/// OpenAI-compatible embedding provider (SiliconFlow by default).
///
/// Forwards a fixed parameter set: the configured model, float encoding and
/// the configured dimensionality. Callers cannot override any of these.
pub struct OpenAiCompatProvider {
    base_url: String,
    api_key: String,
    model_name: String,
    dimensions: u32,
    http_client: reqwest::Client,
}

#[derive(Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
    encoding_format: &'static str,
    dimensions: u32,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    usage: Option<UsageResponse>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize, Default)]
struct UsageResponse {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl OpenAiCompatProvider {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model_name: &str,
        dimensions: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model_name: model_name.to_string(),
            dimensions,
            http_client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiCompatProvider {
    async fn embed(&self, input: &[String]) -> anyhow::Result<EmbeddingBatch> {
        let request = EmbeddingRequest {
            model: self.model_name.clone(),
            input: input.to_vec(),
            encoding_format: "float",
            dimensions: self.dimensions,
        };

        let resp = self
            .http_client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            // Keep the status in the message: classify_upstream_error
            // string-matches on it.
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("embedding API error ({status}): {body}");
        }

        let response: EmbeddingResponse = resp.json().await?;
        let usage = response.usage.unwrap_or_default();
        Ok(EmbeddingBatch {
            vectors: response.data.into_iter().map(|d| d.embedding).collect(),
            usage: Usage {
                prompt_tokens: usage.prompt_tokens,
                total_tokens: usage.total_tokens,
            },
        })
    }
}

/// Classify an upstream failure message into a typed error.
///
/// The upstream client surfaces errors as strings, so 401/429 detection is
/// string matching, isolated here: "401" or "Unauthorized" means bad
/// credentials, "429" or "rate limit" (any case) means throttling, anything
/// else is a generic upstream failure.
pub fn classify_upstream_error(message: &str) -> ProxyError {
    if message.contains("401") || message.contains("Unauthorized") {
        ProxyError::Unauthorized
    } else if message.contains("429") || message.to_lowercase().contains("rate limit") {
        ProxyError::RateLimited
    } else {
        ProxyError::Upstream(message.to_string())
    }
}
