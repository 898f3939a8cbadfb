//! Elasticsearch-compatible log store client.
//!
//! Builds bool/must search queries over the `logs` index and flattens each hit
//! into a [`LogEntry`].

use crate::clients::probe_endpoint;
use crate::error::GatewayError;
use crate::models::{BackendStatus, LogEntry};
use serde::Deserialize;
use serde_json::{json, Value};

const STORE: &str = "elasticsearch";

/// Client for an Elasticsearch-compatible document-search API.
#[derive(Debug, Clone)]
pub struct ElasticsearchClient {
    http: reqwest::Client,
    base_url: String,
}

/// Filters applied to a log search. All optional; an empty filter set returns
/// the most recent entries unfiltered.
#[derive(Debug, Default, Clone)]
pub struct LogFilters {
    /// Match on `service.name`.
    pub service: Option<String>,
    /// Match on `log.level`.
    pub level: Option<String>,
    /// Match on `trace.id`.
    pub trace_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Hits,
}

#[derive(Debug, Default, Deserialize)]
struct Hits {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: LogSource,
}

/// The subset of an ECS log document the gateway cares about.
#[derive(Debug, Deserialize)]
struct LogSource {
    #[serde(rename = "@timestamp")]
    timestamp: Option<String>,
    #[serde(default)]
    log: Option<LogField>,
    message: Option<String>,
    #[serde(default)]
    service: Option<ServiceField>,
    #[serde(default)]
    trace: Option<TraceField>,
}

#[derive(Debug, Deserialize)]
struct LogField {
    level: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceField {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TraceField {
    id: Option<String>,
}

impl From<LogSource> for LogEntry {
    fn from(source: LogSource) -> Self {
        Self {
            timestamp: source.timestamp,
            level: source
                .log
                .and_then(|log| log.level)
                .unwrap_or_else(|| "INFO".to_string()),
            message: source.message,
            service: source.service.and_then(|service| service.name),
            trace_id: source.trace.and_then(|trace| trace.id),
        }
    }
}

impl ElasticsearchClient {
    /// Creates a client for the store at `base_url`.
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    /// Searches the `logs` index, newest first, applying one match clause per
    /// provided filter.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Query`] on transport failure, non-2xx status,
    /// or an unparseable body. Absent filters are never an error.
    pub async fn search(
        &self,
        filters: &LogFilters,
        limit: u32,
    ) -> Result<Vec<LogEntry>, GatewayError> {
        let url = format!("{}/logs/_search", self.base_url);
        let body = build_search_body(filters, limit);

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::query(STORE, format!("log search: {e}")))?;

        if !response.status().is_success() {
            return Err(GatewayError::query(
                STORE,
                format!("log search: upstream returned {}", response.status()),
            ));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::query(STORE, format!("log search: {e}")))?;

        Ok(body.hits.hits.into_iter().map(|hit| hit.source.into()).collect())
    }

    /// Probes the store's cluster-health endpoint.
    pub async fn probe(&self) -> BackendStatus {
        probe_endpoint(&self.http, &format!("{}/_cluster/health", self.base_url)).await
    }
}

/// Builds the search request body: size, newest-first sort, and a bool/must
/// clause list with exactly one match per provided filter.
fn build_search_body(filters: &LogFilters, limit: u32) -> Value {
    let mut must = Vec::new();

    if let Some(service) = &filters.service {
        must.push(json!({"match": {"service.name": service}}));
    }
    if let Some(level) = &filters.level {
        must.push(json!({"match": {"log.level": level}}));
    }
    if let Some(trace_id) = &filters.trace_id {
        must.push(json!({"match": {"trace.id": trace_id}}));
    }

    json!({
        "size": limit,
        "sort": [{"@timestamp": {"order": "desc"}}],
        "query": {"bool": {"must": must}},
    })
}
