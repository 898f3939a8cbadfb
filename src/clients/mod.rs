//! Typed clients for the three backing telemetry stores.
//!
//! Each client wraps a shared [`reqwest::Client`] (which carries the per-call
//! timeout) plus the store's base URL, and owns the translation from that
//! store's native response shape into the gateway's normalized models.

mod elasticsearch;
mod jaeger;
mod prometheus;

pub use elasticsearch::{ElasticsearchClient, LogFilters};
pub use jaeger::JaegerClient;
pub use prometheus::PrometheusClient;

use crate::models::BackendStatus;

/// Probes a liveness endpoint and reports the outcome.
///
/// Any transport error or non-2xx response counts as down; probes never
/// propagate errors so one unreachable store cannot abort the composite
/// status report.
pub(crate) async fn probe_endpoint(http: &reqwest::Client, url: &str) -> BackendStatus {
    match http.get(url).send().await {
        Ok(response) if response.status().is_success() => BackendStatus::up(),
        Ok(response) => BackendStatus::down(format!("unexpected status {}", response.status())),
        Err(error) => BackendStatus::down(error.to_string()),
    }
}
