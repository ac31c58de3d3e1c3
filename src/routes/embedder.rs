use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::app::AppState;
use crate::error::ProxyError;
use crate::meilisearch::{wait_for_task, EmbedderSettings};
use crate::models::api::{EmbedderConfigRequest, EmbedderConfigResponse};

/// Embedder configuration routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/v1/meilisearch/embedder", post(configure_embedder))
}

/// POST /v1/meilisearch/embedder - Point a Meilisearch index's embedder
/// back at this proxy and wait for the settings task to complete.
///
/// A poll or task failure is still an HTTP 200; `success: false` in the
/// payload carries the outcome.
async fn configure_embedder(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmbedderConfigRequest>,
) -> Result<Json<EmbedderConfigResponse>, ProxyError> {
    info!("=== configuring Meilisearch embedder ===");
    info!("index: {}", req.index_id);
    info!("embedder name: {}", req.embedder_name);

    state.settings.validate_search_engine()?;

    state.search.get_index(&req.index_id).await.map_err(|e| {
        ProxyError::Dependency(format!("Failed to configure embedder: {e}"))
    })?;
    info!("found index: {}", req.index_id);

    let descriptor = EmbedderSettings::rest_callback(
        state.settings.callback_url(),
        state.settings.api_key.clone().unwrap_or_default(),
        req.document_template.clone(),
        state.settings.dimensions,
        state.settings.max_token_limit,
    );
    if let Ok(pretty) = serde_json::to_string_pretty(&descriptor) {
        info!("embedder settings: {pretty}");
    }

    let mut embedders = HashMap::new();
    embedders.insert(req.embedder_name.clone(), descriptor);

    let spawned = state
        .search
        .update_embedders(&req.index_id, embedders)
        .await
        .map_err(|e| ProxyError::Dependency(format!("Failed to configure embedder: {e}")))?;
    info!("settings update submitted as task {}", spawned.task_uid);

    let success = wait_for_task(
        state.search.as_ref(),
        &spawned,
        state.settings.poll_interval(),
        state.settings.poll_max_attempts,
    )
    .await;

    let message = if success {
        format!(
            "Successfully configured embedder '{}' for index '{}'",
            req.embedder_name, req.index_id
        )
    } else {
        format!(
            "Failed to configure embedder '{}' for index '{}'",
            req.embedder_name, req.index_id
        )
    };

    Ok(Json(EmbedderConfigResponse {
        success,
        message,
        task_uid: Some(spawned.task_uid),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::embedding::{EmbeddingBatch, EmbeddingProvider};
    use crate::meilisearch::{IndexInfo, SearchEngine, SpawnedTask, Task, TaskError, VersionInfo};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct UnusedProvider;

    #[async_trait]
    impl EmbeddingProvider for UnusedProvider {
        async fn embed(&self, _input: &[String]) -> anyhow::Result<EmbeddingBatch> {
            unimplemented!("not used by the embedder route")
        }
    }

    /// Search engine whose update returns a fixed spawned task and whose
    /// task fetches come from a script.
    struct FakeEngine {
        index_exists: bool,
        spawn_status: String,
        task_script: Mutex<VecDeque<anyhow::Result<Task>>>,
        fetch_count: AtomicUsize,
        submitted: Mutex<Vec<(String, HashMap<String, EmbedderSettings>)>>,
    }

    impl FakeEngine {
        fn new(spawn_status: &str, script: Vec<anyhow::Result<Task>>) -> Self {
            Self {
                index_exists: true,
                spawn_status: spawn_status.to_string(),
                task_script: Mutex::new(script.into()),
                fetch_count: AtomicUsize::new(0),
                submitted: Mutex::new(Vec::new()),
            }
        }

        fn without_index() -> Self {
            let mut engine = Self::new("enqueued", vec![]);
            engine.index_exists = false;
            engine
        }

        fn fetches(&self) -> usize {
            self.fetch_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SearchEngine for FakeEngine {
        async fn get_index(&self, uid: &str) -> anyhow::Result<IndexInfo> {
            if !self.index_exists {
                anyhow::bail!("Meilisearch error (404 Not Found): Index `{uid}` not found.");
            }
            Ok(IndexInfo {
                uid: uid.to_string(),
                primary_key: Some("id".to_string()),
                created_at: None,
                updated_at: None,
            })
        }

        async fn update_embedders(
            &self,
            index_uid: &str,
            embedders: HashMap<String, EmbedderSettings>,
        ) -> anyhow::Result<SpawnedTask> {
            self.submitted
                .lock()
                .unwrap()
                .push((index_uid.to_string(), embedders));
            Ok(SpawnedTask {
                task_uid: 42,
                index_uid: Some(index_uid.to_string()),
                status: self.spawn_status.clone(),
                kind: Some("settingsUpdate".to_string()),
                enqueued_at: None,
            })
        }

        async fn get_task(&self, _task_uid: u64) -> anyhow::Result<Task> {
            self.fetch_count.fetch_add(1, Ordering::SeqCst);
            self.task_script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("script exhausted")))
        }

        async fn get_tasks(&self) -> anyhow::Result<Vec<Task>> {
            unimplemented!()
        }

        async fn get_indexes(&self) -> anyhow::Result<Vec<IndexInfo>> {
            unimplemented!()
        }

        async fn get_version(&self) -> anyhow::Result<VersionInfo> {
            unimplemented!()
        }
    }

    fn test_settings() -> Settings {
        let vars: HashMap<&str, &str> = [
            ("API_KEY", "sk-test"),
            ("SERVICE_URL", "http://proxy:8000"),
            ("EMBEDDING_DIMENSIONS", "1024"),
        ]
        .into();
        Settings::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
    }

    fn state_with(engine: Arc<FakeEngine>) -> Arc<AppState> {
        Arc::new(AppState {
            settings: test_settings(),
            embedder: Arc::new(UnusedProvider),
            search: engine,
        })
    }

    fn config_request(name: Option<&str>) -> EmbedderConfigRequest {
        let mut body = serde_json::json!({
            "index_id": "movies",
            "document_template": "{{doc.title}}"
        });
        if let Some(name) = name {
            body["embedder_name"] = serde_json::Value::String(name.to_string());
        }
        serde_json::from_value(body).unwrap()
    }

    fn task(status: &str) -> Task {
        Task {
            uid: 42,
            index_uid: Some("movies".to_string()),
            status: status.to_string(),
            kind: Some("settingsUpdate".to_string()),
            error: None,
            details: None,
            duration: None,
            enqueued_at: None,
            started_at: None,
            finished_at: None,
        }
    }

    #[tokio::test]
    async fn non_enqueued_spawn_status_skips_polling_and_succeeds() {
        let engine = Arc::new(FakeEngine::new("processing", vec![]));
        let resp = configure_embedder(
            State(state_with(engine.clone())),
            Json(config_request(None)),
        )
        .await
        .unwrap();

        assert!(resp.0.success);
        assert_eq!(resp.0.task_uid, Some(42));
        assert_eq!(engine.fetches(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn polls_enqueued_task_to_success() {
        let engine = Arc::new(FakeEngine::new(
            "enqueued",
            vec![
                Ok(task("processing")),
                Ok(task("processing")),
                Ok(task("succeeded")),
            ],
        ));
        let resp = configure_embedder(
            State(state_with(engine.clone())),
            Json(config_request(Some("custom"))),
        )
        .await
        .unwrap();

        assert!(resp.0.success);
        assert_eq!(
            resp.0.message,
            "Successfully configured embedder 'custom' for index 'movies'"
        );
        assert_eq!(engine.fetches(), 3);
    }

    #[tokio::test]
    async fn task_error_payload_yields_failure_payload_not_http_error() {
        let mut failing = task("processing");
        failing.error = Some(TaskError {
            message: "bad embedder".to_string(),
            code: None,
            error_type: None,
            link: None,
        });
        let engine = Arc::new(FakeEngine::new("enqueued", vec![Ok(failing)]));

        // Still Ok(Json(...)) — failure is carried in the payload.
        let resp = configure_embedder(
            State(state_with(engine.clone())),
            Json(config_request(None)),
        )
        .await
        .unwrap();

        assert!(!resp.0.success);
        assert_eq!(
            resp.0.message,
            "Failed to configure embedder 'default' for index 'movies'"
        );
        assert_eq!(resp.0.task_uid, Some(42));
        assert_eq!(engine.fetches(), 1);
    }

    #[tokio::test]
    async fn missing_index_is_a_dependency_error() {
        let engine = Arc::new(FakeEngine::without_index());
        let err = configure_embedder(State(state_with(engine)), Json(config_request(None)))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::Dependency(_)));
        assert!(err.to_string().contains("Failed to configure embedder"));
    }

    #[tokio::test]
    async fn descriptor_targets_this_proxys_callback_url() {
        let engine = Arc::new(FakeEngine::new("succeeded", vec![]));
        configure_embedder(
            State(state_with(engine.clone())),
            Json(config_request(None)),
        )
        .await
        .unwrap();

        let submitted = engine.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        let (index_uid, embedders) = &submitted[0];
        assert_eq!(index_uid, "movies");
        let descriptor = embedders.get("default").unwrap();
        assert_eq!(descriptor.url, "http://proxy:8000/v1/embeddings");
        assert_eq!(descriptor.api_key, "sk-test");
        assert_eq!(descriptor.document_template, "{{doc.title}}");
        assert_eq!(descriptor.dimensions, 1024);
        assert_eq!(descriptor.document_template_max_bytes, 10000);
    }
}
