//! Normalized response shapes served to the dashboard.
//!
//! Each backing store speaks its own wire format; the handlers translate into
//! these flat, chart-friendly types. Nothing here is persisted - every value
//! is built fresh per request and discarded once the response is sent.

use serde::{Deserialize, Serialize};

/// One sample of a flattened metric series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    /// Sample timestamp as an ISO-8601 string.
    pub time: String,
    /// Sample value.
    pub value: f64,
}

/// Derived status of a trace, taken from its root span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceStatus {
    /// No truthy `error` tag on the root span.
    Success,
    /// The root span carries an `error` tag with a truthy value.
    Error,
}

/// Summary of a single trace, reduced to its root span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSummary {
    /// The trace's ID.
    pub trace_id: String,
    /// Operation name of the root span.
    pub name: String,
    /// Derived success/error status.
    pub status: TraceStatus,
    /// Root span duration in milliseconds, rounded to the nearest integer.
    pub duration_ms: i64,
    /// Root span start time as an ISO-8601 string.
    pub timestamp: String,
}

/// One log record, flattened from a search hit.
///
/// Fields other than `level` may be absent from the source document and are
/// omitted from the response when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Document timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Log level, `"INFO"` when the document carries none.
    pub level: String,
    /// Log message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Emitting service name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Correlated trace ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// Reachability of a single backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendHealth {
    /// The probe succeeded.
    Up,
    /// The probe failed or timed out.
    Down,
}

/// Probe outcome for a single backing store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendStatus {
    /// Whether the store answered its liveness probe.
    pub status: BackendHealth,
    /// Probe failure detail, present only when the store is down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BackendStatus {
    /// A reachable store.
    #[must_use]
    pub fn up() -> Self {
        Self {
            status: BackendHealth::Up,
            error: None,
        }
    }

    /// An unreachable store, with the probe's failure message.
    #[must_use]
    pub fn down(error: impl Into<String>) -> Self {
        Self {
            status: BackendHealth::Down,
            error: Some(error.into()),
        }
    }
}

/// Composite reachability report over all three backing stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Metrics store reachability.
    pub prometheus: BackendStatus,
    /// Trace store reachability.
    pub jaeger: BackendStatus,
    /// Log store reachability.
    pub elasticsearch: BackendStatus,
}
