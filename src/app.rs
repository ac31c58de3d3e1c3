use std::sync::Arc;

use crate::config::Settings;
use crate::embedding::EmbeddingProvider;
use crate::meilisearch::SearchEngine;

/// Shared application state passed to all route handlers.
///
/// The two client handles are constructed once at startup and are
/// stateless; nothing here is mutated after construction.
pub struct AppState {
    pub settings: Settings,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub search: Arc<dyn SearchEngine>,
}
