use serde::{Deserialize, Serialize};

use crate::meilisearch::{IndexInfo, Task};

// ──────────────────────────── Embeddings ────────────────────────────

/// Inbound embedding request: a single string or an ordered list.
#[derive(Debug, Deserialize)]
pub struct EmbeddingRequest {
    pub input: EmbeddingInput,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    Single(String),
    Many(Vec<String>),
}

impl EmbeddingInput {
    /// Normalize into an ordered list; a single string becomes a
    /// one-element list.
    pub fn into_list(self) -> Vec<String> {
        match self {
            EmbeddingInput::Single(s) => vec![s],
            EmbeddingInput::Many(list) => list,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmbeddingVector {
    pub embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingVector>,
}

// ──────────────────────────── Embedder configuration ────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EmbedderConfigRequest {
    pub index_id: String,
    #[serde(default = "default_embedder_name")]
    pub embedder_name: String,
    pub document_template: String,
}

fn default_embedder_name() -> String {
    "default".to_string()
}

/// Poll/task failure is reported in this payload with `success: false`;
/// the HTTP status stays 200 either way.
#[derive(Debug, Serialize)]
pub struct EmbedderConfigResponse {
    pub success: bool,
    pub message: String,
    pub task_uid: Option<u64>,
}

// ──────────────────────────── Read endpoints ────────────────────────────

#[derive(Debug, Serialize)]
pub struct TasksResponse {
    pub success: bool,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
pub struct IndexesResponse {
    pub success: bool,
    pub indexes: Vec<IndexInfo>,
}

// ──────────────────────────── Health ────────────────────────────

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub config_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_token_limit: Option<usize>,
    pub meilisearch_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meilisearch_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
