//! Backend status endpoint.
//!
//! Probes all three backing stores concurrently and reports each outcome
//! independently. This endpoint never fails as a whole; an unreachable store
//! is a normal, representable result.

use crate::models::StatusResponse;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};

/// Creates the status routes.
pub fn status_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(backend_status))
        .with_state(state)
}

async fn backend_status(State(state): State<AppState>) -> Json<StatusResponse> {
    // The probes have no data dependency; total latency is bounded by the
    // slowest probe, not the sum.
    let (prometheus, jaeger, elasticsearch) = tokio::join!(
        state.prometheus().probe(),
        state.jaeger().probe(),
        state.elasticsearch().probe(),
    );

    Json(StatusResponse {
        prometheus,
        jaeger,
        elasticsearch,
    })
}
