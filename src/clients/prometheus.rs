//! Prometheus-compatible metrics store client.
//!
//! Issues range queries and flattens the first result series into the
//! chart-friendly `[{time, value}]` shape.

use crate::clients::probe_endpoint;
use crate::error::GatewayError;
use crate::models::{BackendStatus, MetricPoint};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

const STORE: &str = "prometheus";

/// Client for a Prometheus-compatible range-query API.
#[derive(Debug, Clone)]
pub struct PrometheusClient {
    http: reqwest::Client,
    base_url: String,
}

/// Top-level envelope of a range-query response.
#[derive(Debug, Deserialize)]
struct RangeResponse {
    status: String,
    #[serde(default)]
    data: RangeData,
}

#[derive(Debug, Default, Deserialize)]
struct RangeData {
    #[serde(default)]
    result: Vec<RangeSeries>,
}

/// One series of a range vector; `values` holds `[timestamp, "value"]` pairs.
#[derive(Debug, Default, Deserialize)]
struct RangeSeries {
    #[serde(default)]
    values: Vec<(f64, String)>,
}

impl PrometheusClient {
    /// Creates a client for the store at `base_url`.
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    /// Runs a range query and flattens the first returned series.
    ///
    /// An upstream success with zero series yields an empty vector, not an
    /// error. `start` and `end` are passed through verbatim; Prometheus
    /// accepts both epoch seconds and RFC 3339.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Query`] if the call fails, the response is not
    /// 2xx, the body cannot be parsed, the response status field is not
    /// `"success"`, or a sample value is non-numeric.
    pub async fn query_range(
        &self,
        query: &str,
        start: &str,
        end: &str,
        step: &str,
    ) -> Result<Vec<MetricPoint>, GatewayError> {
        let url = format!("{}/api/v1/query_range", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("query", query), ("start", start), ("end", end), ("step", step)])
            .send()
            .await
            .map_err(|e| GatewayError::query(STORE, format!("range query {query:?}: {e}")))?;

        if !response.status().is_success() {
            return Err(GatewayError::query(
                STORE,
                format!("range query {query:?}: upstream returned {}", response.status()),
            ));
        }

        let body: RangeResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::query(STORE, format!("range query {query:?}: {e}")))?;

        if body.status != "success" {
            return Err(GatewayError::query(
                STORE,
                format!("range query {query:?}: response status {:?}", body.status),
            ));
        }

        match body.data.result.into_iter().next() {
            Some(series) => flatten_series(&series),
            None => Ok(Vec::new()),
        }
    }

    /// Probes the store's readiness endpoint.
    pub async fn probe(&self) -> BackendStatus {
        probe_endpoint(&self.http, &format!("{}/-/ready", self.base_url)).await
    }
}

/// Maps a range-vector series to one [`MetricPoint`] per sample.
///
/// Sample order is preserved; Prometheus returns samples in ascending time
/// order. A sample value that does not parse as a float is surfaced as an
/// error rather than dropped.
fn flatten_series(series: &RangeSeries) -> Result<Vec<MetricPoint>, GatewayError> {
    series
        .values
        .iter()
        .map(|(timestamp, raw)| {
            let value: f64 = raw.parse().map_err(|_| {
                GatewayError::query(STORE, format!("non-numeric sample value {raw:?}"))
            })?;
            Ok(MetricPoint {
                time: epoch_seconds_to_iso(*timestamp),
                value,
            })
        })
        .collect()
}

/// Converts fractional epoch seconds to an ISO-8601 string with millisecond
/// precision. Timestamps outside chrono's representable range collapse to the
/// epoch.
fn epoch_seconds_to_iso(seconds: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let millis = (seconds * 1000.0).round() as i64;
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
