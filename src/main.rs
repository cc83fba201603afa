//! llm-versus - two language models talking to each other
//!
//! Streams an automated, turn-taking conversation between two
//! Ollama-hosted models to a browser viewer over a WebSocket.

mod api;
mod config;
mod llm;
mod runtime;
mod sanitize;
mod state_machine;

use api::{create_router, AppState};
use config::ServerConfig;
use llm::{LoggingClient, ModelClient, OllamaClient};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "llm_versus=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = ServerConfig::from_env()?;

    // Backend client, shared by every connection
    let ollama = OllamaClient::new(&config.ollama_addr)?;
    tracing::info!(backend = %ollama.base_url(), "Using inference backend");
    let client: Arc<dyn ModelClient> = Arc::new(LoggingClient::new(Arc::new(ollama)));

    let state = AppState::new(client);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state, &config.static_dir)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    tracing::info!(
        static_dir = %config.static_dir.display(),
        "llm-versus listening on {}",
        config.listen_addr
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
