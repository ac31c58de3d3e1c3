//! Meilisearch embedding proxy.
//!
//! A small relay that forwards embedding requests to an OpenAI-compatible
//! API under truncation and model-selection rules, and configures
//! Meilisearch REST embedders that call back into this service.

pub mod app;
pub mod config;
pub mod embedding;
pub mod error;
pub mod meilisearch;
pub mod models;
pub mod routes;

pub use app::AppState;
pub use config::Settings;
pub use error::ProxyError;
