//! Health check endpoint.
//!
//! Provides a simple health check endpoint for load balancers and monitoring
//! systems. Performs no outbound calls; backend reachability lives under
//! `/api/status`.

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status (always "UP" if reachable).
    pub status: &'static str,
}

/// Creates the health check routes.
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "UP" })
}
