//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use crate::clients::{ElasticsearchClient, JaegerClient, PrometheusClient};
use crate::config::Config;
use anyhow::Result;

/// Application state shared across all request handlers.
///
/// Holds one typed client per backing store. All three share a single
/// connection pool and the configured per-call timeout. The gateway keeps no
/// other state between requests.
#[derive(Clone)]
pub struct AppState {
    prometheus: PrometheusClient,
    jaeger: JaegerClient,
    elasticsearch: ElasticsearchClient,
}

impl AppState {
    /// Builds the state from configuration, constructing the shared HTTP
    /// client with the configured upstream timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;

        Ok(Self {
            prometheus: PrometheusClient::new(http.clone(), config.prometheus_url.clone()),
            jaeger: JaegerClient::new(http.clone(), config.jaeger_url.clone()),
            elasticsearch: ElasticsearchClient::new(http, config.elasticsearch_url.clone()),
        })
    }

    /// Returns the metrics store client.
    #[must_use]
    pub fn prometheus(&self) -> &PrometheusClient {
        &self.prometheus
    }

    /// Returns the trace store client.
    #[must_use]
    pub fn jaeger(&self) -> &JaegerClient {
        &self.jaeger
    }

    /// Returns the log store client.
    #[must_use]
    pub fn elasticsearch(&self) -> &ElasticsearchClient {
        &self.elasticsearch
    }
}
