//! Logs query endpoint.
//!
//! Translates dashboard log queries into Elasticsearch bool/must searches.
//! All filters are optional; with none given the newest entries are returned
//! unfiltered.

use crate::clients::LogFilters;
use crate::error::GatewayError;
use crate::models::LogEntry;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

/// Query parameters for `/api/logs`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogParams {
    /// Service name filter (optional).
    pub service: Option<String>,
    /// Log level filter (optional).
    pub level: Option<String>,
    /// Trace ID filter (optional).
    pub trace_id: Option<String>,
    /// Maximum number of entries to return (default: 100).
    pub limit: Option<u32>,
}

/// Creates the logs routes.
pub fn logs_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/logs", get(query_logs))
        .with_state(state)
}

async fn query_logs(
    State(state): State<AppState>,
    Query(params): Query<LogParams>,
) -> Result<Json<Vec<LogEntry>>, GatewayError> {
    let filters = LogFilters {
        service: params.service,
        level: params.level,
        trace_id: params.trace_id,
    };
    let limit = params.limit.unwrap_or(100);

    let entries = state.elasticsearch().search(&filters, limit).await?;

    Ok(Json(entries))
}
