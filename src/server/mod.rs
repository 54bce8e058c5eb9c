//! HTTP and WebSocket surface for the dashboard.
//!
//! ```text
//! ┌──────────┐   HTTP    ┌───────────────────────────────────────────┐
//! │ Browser  │ ────────> │ api.rs   (routes, AppState, ApiError)     │
//! │          │ <──────── │   │                                       │
//! └──────────┘ WebSocket │   └─ DashboardService ── SheetStore       │
//!                        │ ws.rs    (WsMessage, socket loop)         │
//!                        │   └─ refresh.rs (one RefreshTask/session) │
//!                        └───────────────────────────────────────────┘
//! ```
//!
//! Writes made through the API are broadcast to every open socket; each
//! socket additionally receives its own periodic `OverviewRefreshed`.

pub mod api;
pub mod refresh;
pub mod ws;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;

use crate::dashboard::DashboardService;
use api::{AppState, SharedState};

/// Configuration for the dashboard server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Bind on all interfaces with permissive CORS.
    pub dev_mode: bool,
    pub refresh_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            dev_mode: false,
            refresh_interval: Duration::from_secs(30),
        }
    }
}

/// Build the full application router with API and WebSocket routes.
pub fn build_router(state: SharedState) -> Router {
    api::api_router()
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
}

/// Serve until Ctrl+C, then release the spreadsheet session.
pub async fn start_server(config: ServerConfig, service: Arc<DashboardService>) -> Result<()> {
    let (ws_tx, _rx) = broadcast::channel::<String>(256);
    let state = Arc::new(AppState {
        service: service.clone(),
        ws_tx,
        refresh_interval: config.refresh_interval,
    });

    let mut app = build_router(state);
    if config.dev_mode {
        app = app.layer(CorsLayer::permissive());
    }

    let host = if config.dev_mode { "0.0.0.0" } else { "127.0.0.1" };
    let addr = format!("{}:{}", host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    tracing::info!(%local_addr, dev_mode = config.dev_mode, "dashboard server listening");
    println!("Pipeline Control running at http://{}", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    service.shutdown().await;
    println!("Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
