//! Paper trading server entry point

use anyhow::Context;
use papertrade_server::config::Config;
use papertrade_server::server::ApiServer;
use papertrade_server::state::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "papertrade_server=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting paper trading server...");

    let config = Config::from_env().context("failed to load configuration")?;
    let state = Arc::new(AppState::new(config));

    // Start the mock push channel
    state.feed.connect();

    let mut server = ApiServer::new(state.clone());
    let addr = server.start().await.context("failed to start API server")?;
    tracing::info!("Paper trading server listening on {}", addr);

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    tracing::info!("Shutdown signal received");
    server.stop();
    state.feed.disconnect();

    Ok(())
}
