//! HTTP/WebSocket server
//!
//! Serves the REST API the trading frontend consumes, plus the `/ws`
//! endpoint that bridges the mock push channel to browser clients.

pub mod handlers;
pub mod types;
pub mod ws;

use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// API server manager
pub struct ApiServer {
    state: Arc<AppState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            shutdown_tx: None,
        }
    }

    /// Build the full route table
    pub fn router(state: Arc<AppState>) -> Router {
        // Allow all origins for local development
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            // Health check
            .route("/health", get(handlers::health_check))
            .route("/", get(handlers::health_check))
            // Auth
            .route("/api/v1/register", post(handlers::register))
            .route("/api/v1/login", post(handlers::login))
            .route("/api/v1/logout", post(handlers::logout))
            .route(
                "/api/v1/account",
                get(handlers::get_account).patch(handlers::update_balance),
            )
            // Orders
            .route(
                "/api/v1/orders",
                post(handlers::place_order).get(handlers::list_orders),
            )
            .route("/api/v1/orders/:order_id/cancel", post(handlers::cancel_order))
            // Portfolio
            .route(
                "/api/v1/portfolio",
                get(handlers::get_portfolio).post(handlers::create_position),
            )
            // Market data
            .route("/api/v1/quotes/:code", get(handlers::get_quote))
            .route("/api/v1/market/:market", get(handlers::get_market_list))
            .route("/api/v1/quota", get(handlers::get_quota))
            // Assistant
            .route("/api/v1/assistant", post(handlers::assistant))
            // Mock push channel
            .route("/ws", get(ws::ws_handler))
            .with_state(state)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Bind and start serving in a background task
    pub async fn start(&mut self) -> Result<SocketAddr> {
        let addr: SocketAddr = format!("{}:{}", self.state.config.host, self.state.config.port)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid bind address: {}", e)))?;

        let app = Self::router(self.state.clone());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Config(format!("Failed to bind to {}: {}", addr, e)))?;

        let local_addr = listener
            .local_addr()
            .map_err(|e| AppError::Internal(format!("Failed to read local address: {}", e)))?;

        info!("Starting paper trading API server on {}", local_addr);

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("API server shutting down");
            });

            if let Err(e) = server.await {
                error!("API server error: {}", e);
            }
        });

        info!("Endpoints:");
        info!("  GET  http://{}/health", local_addr);
        info!("  POST http://{}/api/v1/register", local_addr);
        info!("  POST http://{}/api/v1/login", local_addr);
        info!("  GET  http://{}/api/v1/quotes/{{code}}", local_addr);
        info!("  GET  ws://{}/ws", local_addr);

        Ok(local_addr)
    }

    /// Stop the server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            info!("API server stop signal sent");
        }
    }

    /// Check if the server is running
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}
