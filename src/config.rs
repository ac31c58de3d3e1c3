use std::time::Duration;

/// Immutable service settings resolved from the environment.
///
/// Loaded once at startup; validation of required fields happens on demand
/// via [`Settings::validate_core`] and [`Settings::validate_search_engine`]
/// rather than eagerly at load time.
#[derive(Debug, Clone)]
pub struct Settings {
    // Upstream embedding API
    pub api_key: Option<String>,
    pub base_url: String,
    pub model_name: String,
    pub dimensions: u32,
    /// Maximum input length, interpreted as a character count despite the
    /// historical MAX_TOKEN_LIMIT variable name.
    pub max_token_limit: usize,
    pub timeout_secs: u64,

    // Meilisearch
    pub meilisearch_url: String,
    pub meilisearch_api_key: Option<String>,

    /// Externally reachable URL of this service, used when configuring
    /// Meilisearch embedders to call back into `/v1/embeddings`.
    pub service_url: String,

    // Server
    pub host: String,
    pub port: u16,
    pub log_level: String,

    // Task polling. The interval matches the original fixed 2-second sleep;
    // max_attempts is unbounded unless POLL_MAX_ATTEMPTS is set.
    pub poll_interval_secs: u64,
    pub poll_max_attempts: Option<u32>,
}

/// A missing or malformed setting.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ConfigError(pub String);

fn default_base_url() -> String {
    "https://api.siliconflow.cn/v1".to_string()
}
fn default_model_name() -> String {
    "BAAI/bge-large-zh-v1.5".to_string()
}
fn default_meilisearch_url() -> String {
    "http://meilisearch:7700".to_string()
}
fn default_service_url() -> String {
    "http://embedding_proxy:8000".to_string()
}

impl Settings {
    /// Load settings from process environment variables, reading `.env`
    /// first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup. Tests use this to
    /// inject variables without touching the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Settings {
            api_key: get("API_KEY").filter(|v| !v.is_empty()),
            base_url: get("BASE_URL").unwrap_or_else(default_base_url),
            model_name: get("MODEL_NAME").unwrap_or_else(default_model_name),
            dimensions: parse_var(&get, "EMBEDDING_DIMENSIONS", 1024)?,
            max_token_limit: parse_var(&get, "MAX_TOKEN_LIMIT", 10000)?,
            timeout_secs: parse_var(&get, "TIMEOUT", 30)?,
            meilisearch_url: get("MEILISEARCH_URL").unwrap_or_else(default_meilisearch_url),
            meilisearch_api_key: get("MEILI_MASTER_KEY").filter(|v| !v.is_empty()),
            service_url: get("SERVICE_URL").unwrap_or_else(default_service_url),
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var(&get, "PORT", 8000)?,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "INFO".to_string()),
            poll_interval_secs: parse_var(&get, "POLL_INTERVAL", 2)?,
            poll_max_attempts: match get("POLL_MAX_ATTEMPTS") {
                Some(raw) => Some(parse_value("POLL_MAX_ATTEMPTS", &raw)?),
                None => None,
            },
        })
    }

    /// The upstream API key is the only setting with no default.
    pub fn validate_core(&self) -> Result<(), ConfigError> {
        if self.api_key.is_none() {
            return Err(ConfigError(
                "API_KEY environment variable is required".to_string(),
            ));
        }
        Ok(())
    }

    /// A URL default exists, so this only fires if MEILISEARCH_URL is set
    /// to an empty string.
    pub fn validate_search_engine(&self) -> Result<(), ConfigError> {
        if self.meilisearch_url.is_empty() {
            return Err(ConfigError(
                "MEILISEARCH_URL environment variable is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// URL Meilisearch should call back into for embeddings.
    pub fn callback_url(&self) -> String {
        format!("{}/v1/embeddings", self.service_url)
    }
}

fn parse_var<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse()
        .map_err(|_| ConfigError(format!("invalid value for {key}: {raw:?}")))
}
