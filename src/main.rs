use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use meili_embedding_proxy::app::AppState;
use meili_embedding_proxy::config::Settings;
use meili_embedding_proxy::embedding::openai::OpenAiCompatProvider;
use meili_embedding_proxy::meilisearch::rest::MeiliRestClient;
use meili_embedding_proxy::routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (reads .env first if present).
    let settings = Settings::from_env()?;

    // Initialize tracing. LOG_LEVEL drives the filter unless RUST_LOG is set.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::try_new(settings.log_level.to_lowercase())
                    .unwrap_or_else(|_| EnvFilter::new("info"))
            }),
        )
        .init();

    info!("Starting Meilisearch embedding proxy...");

    if let Err(e) = settings.validate_core() {
        error!("configuration validation failed: {e}");
        error!("check the environment, in particular API_KEY");
        std::process::exit(1);
    }
    info!("configuration validated");
    info!("model: {}", settings.model_name);
    info!("max input length: {} characters", settings.max_token_limit);
    info!("upstream base URL: {}", settings.base_url);
    info!("Meilisearch URL: {}", settings.meilisearch_url);

    // Stateless client handles, constructed once and shared.
    let embedder = Arc::new(OpenAiCompatProvider::new(
        &settings.base_url,
        settings.api_key.as_deref().unwrap_or_default(),
        &settings.model_name,
        settings.dimensions,
        settings.request_timeout(),
    ));
    let search = Arc::new(MeiliRestClient::new(
        &settings.meilisearch_url,
        settings.meilisearch_api_key.as_deref(),
        settings.request_timeout(),
    ));

    let state = Arc::new(AppState {
        settings: settings.clone(),
        embedder,
        search,
    });

    let app = routes::build_router(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;
    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
