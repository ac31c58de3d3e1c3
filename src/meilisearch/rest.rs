use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::{EmbedderSettings, IndexInfo, SearchEngine, SpawnedTask, Task, VersionInfo};

/// Meilisearch REST client.
///
/// Stateless apart from the connection pool; constructed once at startup
/// and shared behind an `Arc`.
pub struct MeiliRestClient {
    base_url: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

/// Paginated list wrapper used by `/tasks` and `/indexes`.
#[derive(Deserialize)]
struct Results<T> {
    results: Vec<T>,
}

impl MeiliRestClient {
    pub fn new(base_url: &str, api_key: Option<&str>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(|k| k.to_string()),
            http_client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .http_client
            .request(method, format!("{}{path}", self.base_url));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }

    async fn expect_json<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> anyhow::Result<T> {
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Meilisearch error ({status}): {body}");
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl SearchEngine for MeiliRestClient {
    async fn get_index(&self, uid: &str) -> anyhow::Result<IndexInfo> {
        let resp = self
            .request(reqwest::Method::GET, &format!("/indexes/{uid}"))
            .send()
            .await?;
        Self::expect_json(resp).await
    }

    async fn update_embedders(
        &self,
        index_uid: &str,
        embedders: HashMap<String, EmbedderSettings>,
    ) -> anyhow::Result<SpawnedTask> {
        let resp = self
            .request(
                reqwest::Method::PATCH,
                &format!("/indexes/{index_uid}/settings/embedders"),
            )
            .json(&embedders)
            .send()
            .await?;
        Self::expect_json(resp).await
    }

    async fn get_task(&self, task_uid: u64) -> anyhow::Result<Task> {
        let resp = self
            .request(reqwest::Method::GET, &format!("/tasks/{task_uid}"))
            .send()
            .await?;
        Self::expect_json(resp).await
    }

    async fn get_tasks(&self) -> anyhow::Result<Vec<Task>> {
        let resp = self.request(reqwest::Method::GET, "/tasks").send().await?;
        let list: Results<Task> = Self::expect_json(resp).await?;
        Ok(list.results)
    }

    async fn get_indexes(&self) -> anyhow::Result<Vec<IndexInfo>> {
        let resp = self.request(reqwest::Method::GET, "/indexes").send().await?;
        let list: Results<IndexInfo> = Self::expect_json(resp).await?;
        Ok(list.results)
    }

    async fn get_version(&self) -> anyhow::Result<VersionInfo> {
        let resp = self.request(reqwest::Method::GET, "/version").send().await?;
        Self::expect_json(resp).await
    }
}
