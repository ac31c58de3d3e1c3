use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::config::ConfigError;

/// Top-level error type for the proxy's HTTP surface.
///
/// Each variant maps to one HTTP status; the body is always
/// `{"detail": message}`.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("API key is invalid or unauthorized")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Failed to create embeddings: {0}")]
    Upstream(String),

    #[error("{0}")]
    Dependency(String),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ProxyError::Unauthorized => StatusCode::UNAUTHORIZED,
            ProxyError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ProxyError::Upstream(_) | ProxyError::Dependency(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ProxyError::InvalidInput(_) => "invalid input",
            ProxyError::Unauthorized => "unauthorized",
            ProxyError::RateLimited => "rate limited",
            ProxyError::Upstream(_) => "upstream error",
            ProxyError::Dependency(_) => "dependency unavailable",
        }
    }
}

/// Config failures hit inside a handler surface as a 500.
impl From<ConfigError> for ProxyError {
    fn from(err: ConfigError) -> Self {
        ProxyError::Dependency(err.to_string())
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        error!("{}: {self}", self.kind());
        let body = Json(json!({ "detail": self.to_string() }));
        (self.status_code(), body).into_response()
    }
}
