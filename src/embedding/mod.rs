pub mod openai;

use async_trait::async_trait;

pub use openai::classify_upstream_error;

/// Token usage counters reported by the upstream API.
#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub total_tokens: u32,
}

/// One batch of embedding vectors, order-preserving with the input, plus
/// the usage counters that came back with it.
#[derive(Debug, Clone)]
pub struct EmbeddingBatch {
    pub vectors: Vec<Vec<f32>>,
    pub usage: Usage,
}

/// Abstract upstream embedding provider interface.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a list of normalized input strings. Returns one vector per
    /// input, in input order.
    async fn embed(&self, input: &[String]) -> anyhow::Result<EmbeddingBatch>;
}
