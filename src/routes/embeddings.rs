use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::AppState;
use crate::embedding::classify_upstream_error;
use crate::error::ProxyError;
use crate::models::api::{EmbeddingRequest, EmbeddingResponse, EmbeddingVector};

/// Embedding relay routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/v1/embeddings", post(create_embeddings))
}

/// POST /v1/embeddings - Forward an embedding request upstream.
///
/// Normalizes the input, truncates oversized entries, forwards the batch
/// with the configured model and dimensionality, and reshapes the response
/// down to `{data: [{embedding}]}`.
async fn create_embeddings(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmbeddingRequest>,
) -> Result<Json<EmbeddingResponse>, ProxyError> {
    info!("=== forwarding embedding request ===");

    let limit = state.settings.max_token_limit;
    let input: Vec<String> = req
        .input
        .into_list()
        .into_iter()
        .map(|text| truncate_to_limit(text, limit))
        .collect();

    if input.is_empty() {
        return Err(ProxyError::InvalidInput(
            "Input must be a string or a list of strings".to_string(),
        ));
    }

    info!("model: {}", state.settings.model_name);
    info!("input count: {}", input.len());

    let batch = state
        .embedder
        .embed(&input)
        .await
        .map_err(|e| classify_upstream_error(&e.to_string()))?;

    info!("=== upstream API responded ===");
    info!("response count: {}", batch.vectors.len());
    info!("total tokens: {}", batch.usage.total_tokens);
    info!("prompt tokens: {}", batch.usage.prompt_tokens);

    Ok(Json(EmbeddingResponse {
        data: batch
            .vectors
            .into_iter()
            .map(|embedding| EmbeddingVector { embedding })
            .collect(),
    }))
}

/// Truncate to at most `limit` characters. A character count, not tokens
/// or bytes; truncation never splits a multi-byte code point.
fn truncate_to_limit(text: String, limit: usize) -> String {
    if text.chars().count() > limit {
        warn!("input text exceeds {limit} character limit, truncated");
        text.chars().take(limit).collect()
    } else {
        text
    }
}
