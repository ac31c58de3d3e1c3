pub mod embedder;
pub mod embeddings;
pub mod meta;

use axum::Router;
use std::sync::Arc;

use crate::app::AppState;

/// Build all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(embeddings::routes())
        .merge(embedder::routes())
        .merge(meta::routes())
        .with_state(state)
}
