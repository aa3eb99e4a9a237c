//! MetricDeck - business KPI dashboard backend
//!
//! Main entry point for the HTTP server.

use std::sync::Arc;

use anyhow::Context;
use metricdeck_api::utils::init_tracing;
use metricdeck_api::{build_router, AppContext};
use metricdeck_infra::config;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment must be loaded before the log format is known.
    let dotenv = dotenvy::dotenv();

    let config = config::load().context("failed to load configuration")?;
    init_tracing(config.logging.format);

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(err) => warn!(error = %err, "Could not load .env file"),
    }

    let ctx = AppContext::new(&config).context("failed to initialize application context")?;
    let app = build_router(Arc::new(ctx));

    let address = config.server.bind_address();
    let listener =
        TcpListener::bind(&address).await.with_context(|| format!("failed to bind {address}"))?;
    info!(address = %address, backend = config.warehouse.backend_name(), "MetricDeck listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("MetricDeck stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
