pub mod rest;
pub mod tasks;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

pub use tasks::wait_for_task;

/// Embedder settings submitted to Meilisearch, describing how it should
/// call back into this proxy for vectors. Serialized camelCase to match
/// the Meilisearch settings API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedderSettings {
    pub source: &'static str,
    pub url: String,
    pub request: serde_json::Value,
    pub api_key: String,
    pub document_template: String,
    pub dimensions: u32,
    pub document_template_max_bytes: usize,
    pub response: serde_json::Value,
}

impl EmbedderSettings {
    /// Build a REST-source embedder pointing at this proxy's embeddings
    /// endpoint. The request/response templates mirror the simplified
    /// `{input: [...]}` / `{data: [{embedding}]}` wire contract.
    pub fn rest_callback(
        url: String,
        api_key: String,
        document_template: String,
        dimensions: u32,
        document_template_max_bytes: usize,
    ) -> Self {
        Self {
            source: "rest",
            url,
            request: json!({ "input": ["{{text}}", "{{..}}"] }),
            api_key,
            document_template,
            dimensions,
            document_template_max_bytes,
            response: json!({ "data": [{ "embedding": "{{embedding}}" }, "{{..}}"] }),
        }
    }
}

/// What the settings-update endpoint returns: a freshly spawned task,
/// accepted but not yet applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnedTask {
    pub task_uid: u64,
    #[serde(default)]
    pub index_uid: Option<String>,
    /// Open string enum: enqueued, processing, succeeded, failed, plus
    /// whatever future Meilisearch versions add.
    pub status: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub enqueued_at: Option<String>,
}

/// A task record from the task queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub uid: u64,
    #[serde(default)]
    pub index_uid: Option<String>,
    pub status: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub error: Option<TaskError>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub enqueued_at: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    pub uid: String,
    #[serde(default)]
    pub primary_key: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub pkg_version: String,
}

/// Abstract Meilisearch client interface.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    async fn get_index(&self, uid: &str) -> anyhow::Result<IndexInfo>;

    /// Submit embedder settings for an index. Returns immediately with a
    /// spawned task; the settings apply asynchronously.
    async fn update_embedders(
        &self,
        index_uid: &str,
        embedders: HashMap<String, EmbedderSettings>,
    ) -> anyhow::Result<SpawnedTask>;

    async fn get_task(&self, task_uid: u64) -> anyhow::Result<Task>;

    async fn get_tasks(&self) -> anyhow::Result<Vec<Task>>;

    async fn get_indexes(&self) -> anyhow::Result<Vec<IndexInfo>>;

    async fn get_version(&self) -> anyhow::Result<VersionInfo>;
}
