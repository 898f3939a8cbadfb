//! Traces query endpoint.
//!
//! Translates dashboard trace queries into Jaeger trace searches and returns
//! one root-span summary per trace.

use crate::error::GatewayError;
use crate::models::TraceSummary;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

/// Query parameters for `/api/traces`.
#[derive(Debug, Deserialize)]
pub struct TraceParams {
    /// Service name to search (required).
    pub service: Option<String>,
    /// Operation name filter (optional).
    pub operation: Option<String>,
    /// Maximum number of traces to return (default: 10).
    pub limit: Option<u32>,
}

/// Creates the traces routes.
pub fn traces_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/traces", get(query_traces))
        .with_state(state)
}

async fn query_traces(
    State(state): State<AppState>,
    Query(params): Query<TraceParams>,
) -> Result<Json<Vec<TraceSummary>>, GatewayError> {
    let service = params
        .service
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GatewayError::Validation("Service parameter is required".to_string()))?;

    let limit = params.limit.unwrap_or(10);

    let traces = state
        .jaeger()
        .search(&service, params.operation.as_deref(), limit)
        .await?;

    Ok(Json(traces))
}
