//! Metrics query endpoint.
//!
//! Translates dashboard metric queries into Prometheus range queries and
//! returns the flattened first series.

use crate::error::GatewayError;
use crate::models::MetricPoint;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

/// Query parameters for `/api/metrics`.
#[derive(Debug, Deserialize)]
pub struct MetricParams {
    /// The metric query expression (required).
    pub query: Option<String>,
    /// Window start, epoch seconds or RFC 3339 (default: one hour ago).
    pub start: Option<String>,
    /// Window end (default: now).
    pub end: Option<String>,
    /// Sampling step (default: "15s").
    pub step: Option<String>,
}

/// Creates the metrics routes.
pub fn metrics_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/metrics", get(query_metrics))
        .with_state(state)
}

async fn query_metrics(
    State(state): State<AppState>,
    Query(params): Query<MetricParams>,
) -> Result<Json<Vec<MetricPoint>>, GatewayError> {
    let query = params
        .query
        .filter(|q| !q.is_empty())
        .ok_or_else(|| GatewayError::Validation("Query parameter is required".to_string()))?;

    // Default window: the preceding hour ending now.
    let now = Utc::now().timestamp();
    let start = params.start.unwrap_or_else(|| (now - 3600).to_string());
    let end = params.end.unwrap_or_else(|| now.to_string());
    let step = params.step.unwrap_or_else(|| "15s".to_string());

    let points = state
        .prometheus()
        .query_range(&query, &start, &end, &step)
        .await?;

    Ok(Json(points))
}
