//! HTTP front end for the lantern answer pipeline.
//!
//! Exposes `POST /v1/search-chat` returning the multiplexed event stream as
//! server-sent events, plus `GET /health` for liveness checks.

mod config;
mod observability;
mod routes;

use std::sync::Arc;

use tracing::info;

use lantern_pipeline::vendors::openrouter::OpenRouterClient;
use lantern_pipeline::{SearchChatPipeline, SearxngClient};

use crate::routes::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::init();
    observability::init_observability();

    let config = config::ServerConfig::from_env()?;
    let search = SearxngClient::new(config.searxng.clone())?;
    let completion = OpenRouterClient::new(config.openrouter.clone())?;
    let pipeline = SearchChatPipeline::new(Arc::new(search), Arc::new(completion));

    let app = routes::router(AppState {
        pipeline: Arc::new(pipeline),
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "lantern server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for shutdown signal");
    }
}
