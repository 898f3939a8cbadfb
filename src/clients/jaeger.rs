//! Jaeger-compatible trace store client.
//!
//! Searches traces by service and reduces each trace to a summary of its root
//! span. Root-span lookup and status derivation are pure functions so they can
//! be tested without a live store.

use crate::clients::probe_endpoint;
use crate::error::GatewayError;
use crate::models::{BackendStatus, TraceStatus, TraceSummary};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::Value;

const STORE: &str = "jaeger";

/// Client for a Jaeger-compatible trace-search API.
#[derive(Debug, Clone)]
pub struct JaegerClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<JaegerTrace>,
}

/// One trace as returned by the search endpoint.
#[derive(Debug, Deserialize)]
struct JaegerTrace {
    #[serde(rename = "traceID")]
    trace_id: String,
    #[serde(default)]
    spans: Vec<JaegerSpan>,
}

/// One span; times and durations are in microseconds.
#[derive(Debug, Deserialize)]
struct JaegerSpan {
    #[serde(rename = "operationName")]
    operation_name: String,
    #[serde(default)]
    references: Vec<SpanReference>,
    #[serde(rename = "startTime")]
    start_time: i64,
    duration: i64,
    #[serde(default)]
    tags: Vec<SpanTag>,
}

/// A parent/child link; only its presence matters here.
#[derive(Debug, Deserialize)]
struct SpanReference {}

#[derive(Debug, Deserialize)]
struct SpanTag {
    key: String,
    #[serde(default)]
    value: Value,
}

impl JaegerClient {
    /// Creates a client for the store at `base_url`.
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    /// Searches traces for a service and summarizes each by its root span.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Query`] on transport failure, non-2xx status,
    /// or an unparseable body, and [`GatewayError::MalformedTrace`] if a
    /// returned trace has no span without parent references.
    pub async fn search(
        &self,
        service: &str,
        operation: Option<&str>,
        limit: u32,
    ) -> Result<Vec<TraceSummary>, GatewayError> {
        let url = format!("{}/api/traces", self.base_url);

        let mut params = vec![
            ("service", service.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(operation) = operation {
            params.push(("operation", operation.to_string()));
        }

        let response = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| GatewayError::query(STORE, format!("trace search {service:?}: {e}")))?;

        if !response.status().is_success() {
            return Err(GatewayError::query(
                STORE,
                format!(
                    "trace search {service:?}: upstream returned {}",
                    response.status()
                ),
            ));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::query(STORE, format!("trace search {service:?}: {e}")))?;

        body.data.into_iter().map(summarize_trace).collect()
    }

    /// Probes the store's service-list endpoint.
    pub async fn probe(&self) -> BackendStatus {
        probe_endpoint(&self.http, &format!("{}/api/services", self.base_url)).await
    }
}

/// Returns the first span with no parent references, if any.
fn find_root_span(spans: &[JaegerSpan]) -> Option<&JaegerSpan> {
    spans.iter().find(|span| span.references.is_empty())
}

/// Reduces a trace to its root-span summary.
fn summarize_trace(trace: JaegerTrace) -> Result<TraceSummary, GatewayError> {
    let root = find_root_span(&trace.spans).ok_or_else(|| GatewayError::MalformedTrace {
        trace_id: trace.trace_id.clone(),
    })?;

    let status = if root
        .tags
        .iter()
        .any(|tag| tag.key == "error" && tag_value_is_truthy(&tag.value))
    {
        TraceStatus::Error
    } else {
        TraceStatus::Success
    };

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let duration_ms = (root.duration as f64 / 1000.0).round() as i64;

    Ok(TraceSummary {
        trace_id: trace.trace_id.clone(),
        name: root.operation_name.clone(),
        status,
        duration_ms,
        timestamp: micros_to_iso(root.start_time),
    })
}

/// JSON truthiness for tag values: `false`, `0`, `""` and `null` are falsy,
/// everything else is truthy.
fn tag_value_is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Converts microseconds since the epoch to an ISO-8601 string, truncating
/// sub-millisecond precision.
fn micros_to_iso(micros: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(micros / 1000)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
