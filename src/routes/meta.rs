use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::AppState;
use crate::error::ProxyError;
use crate::models::api::{HealthResponse, IndexesResponse, TasksResponse};

/// Auxiliary read endpoints, health probe and root metadata.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/meilisearch/tasks", get(list_tasks))
        .route("/v1/meilisearch/indexes", get(list_indexes))
        .route("/health", get(health))
        .route("/", get(root))
}

/// GET /v1/meilisearch/tasks - Pass-through over the task queue.
async fn list_tasks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TasksResponse>, ProxyError> {
    info!("listing Meilisearch tasks");

    state.settings.validate_search_engine()?;
    let tasks = state
        .search
        .get_tasks()
        .await
        .map_err(|e| ProxyError::Dependency(format!("Failed to get tasks: {e}")))?;

    info!("fetched {} tasks", tasks.len());
    Ok(Json(TasksResponse {
        success: true,
        tasks,
    }))
}

/// GET /v1/meilisearch/indexes - Pass-through over the index list.
async fn list_indexes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<IndexesResponse>, ProxyError> {
    info!("listing Meilisearch indexes");

    state.settings.validate_search_engine()?;
    let indexes = state
        .search
        .get_indexes()
        .await
        .map_err(|e| ProxyError::Dependency(format!("Failed to get indexes: {e}")))?;

    info!("fetched {} indexes", indexes.len());
    Ok(Json(IndexesResponse {
        success: true,
        indexes,
    }))
}

/// GET /health
///
/// Core config failure makes the whole check unhealthy; a Meilisearch
/// probe failure only downgrades the `meilisearch_status` sub-field.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    info!("health check");

    if let Err(e) = state.settings.validate_core() {
        return Json(HealthResponse {
            status: "unhealthy".to_string(),
            config_valid: false,
            model: None,
            max_token_limit: None,
            meilisearch_status: "unknown".to_string(),
            meilisearch_url: None,
            error: Some(e.to_string()),
        });
    }

    let meilisearch_status = match state.settings.validate_search_engine() {
        Ok(()) => match state.search.get_version().await {
            Ok(version) => {
                info!("Meilisearch reachable, version {}", version.pkg_version);
                "healthy".to_string()
            }
            Err(e) => {
                warn!("Meilisearch probe failed: {e}");
                format!("unhealthy: {e}")
            }
        },
        Err(e) => {
            warn!("Meilisearch configuration invalid: {e}");
            format!("unhealthy: {e}")
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        config_valid: true,
        model: Some(state.settings.model_name.clone()),
        max_token_limit: Some(state.settings.max_token_limit),
        meilisearch_status,
        meilisearch_url: Some(state.settings.meilisearch_url.clone()),
        error: None,
    })
}

/// GET / - Service metadata and endpoint listing.
async fn root(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "message": "Meilisearch Embedding Proxy Server is running",
        "description": "Forwards embedding requests to an OpenAI-compatible API and configures Meilisearch embedders",
        "config": {
            "model": state.settings.model_name,
            "max_token_limit": state.settings.max_token_limit,
            "base_url": state.settings.base_url,
            "meilisearch_url": state.settings.meilisearch_url,
        },
        "endpoints": {
            "embeddings": "POST /v1/embeddings",
            "meilisearch_embedder": "POST /v1/meilisearch/embedder",
            "meilisearch_tasks": "GET /v1/meilisearch/tasks",
            "meilisearch_indexes": "GET /v1/meilisearch/indexes",
            "health": "GET /health",
        },
    }))
}
