//! Telegate - Telemetry Aggregation Gateway
//!
//! A stateless HTTP gateway that accepts dashboard queries and fans them out
//! to one of three backing telemetry stores, normalizing each store's native
//! response shape into a dashboard-friendly shape:
//!
//! - metrics: a Prometheus-compatible range-query API
//! - traces: a Jaeger-compatible trace-search API
//! - logs: an Elasticsearch-compatible document-search API
//!
//! # Example
//!
//! ```no_run
//! use telegate::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod clients;
mod config;
mod error;
mod models;
mod routes;
mod state;

pub use config::Config;
pub use error::GatewayError;
pub use models::{
    BackendHealth, BackendStatus, LogEntry, MetricPoint, StatusResponse, TraceStatus, TraceSummary,
};
pub use state::AppState;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Runs the gateway with configuration from environment variables.
///
/// Handles graceful shutdown on SIGTERM/SIGINT signals.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Runs the gateway with the provided configuration.
///
/// This is useful for testing or when you want to provide configuration
/// programmatically (for example with fake backing-store URLs).
///
/// # Errors
///
/// Returns an error if:
/// - The HTTP client cannot be constructed
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config) -> Result<()> {
    let addr = config.socket_addr();

    tracing::info!(
        host = %config.host,
        port = %config.port,
        prometheus = %config.prometheus_url,
        jaeger = %config.jaeger_url,
        elasticsearch = %config.elasticsearch_url,
        "Telegate starting"
    );

    let state = AppState::from_config(&config)?;
    let app = create_router(state);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Creates the main application router with all routes and middleware.
///
/// Cross-origin requests are permitted from any origin; the dashboard UI is
/// served from a different origin than the gateway.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::metrics_routes(state.clone()))
        .merge(routes::traces_routes(state.clone()))
        .merge(routes::logs_routes(state.clone()))
        .merge(routes::status_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
