//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;

/// Gateway configuration.
///
/// Configuration values can be set via environment variables:
/// - `TELEGATE_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `TELEGATE_PORT`: The port to listen on (default: 3001)
/// - `TELEGATE_PROMETHEUS_URL`: Base URL of the metrics store (default: <http://localhost:9090>)
/// - `TELEGATE_JAEGER_URL`: Base URL of the trace store (default: <http://localhost:16686>)
/// - `TELEGATE_ELASTICSEARCH_URL`: Base URL of the log store (default: <http://localhost:9200>)
/// - `TELEGATE_UPSTREAM_TIMEOUT_SECS`: Per-call timeout for upstream requests (default: 5)
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Base URL of the Prometheus-compatible metrics store.
    pub prometheus_url: String,
    /// Base URL of the Jaeger-compatible trace store.
    pub jaeger_url: String,
    /// Base URL of the Elasticsearch-compatible log store.
    pub elasticsearch_url: String,
    /// Timeout applied to every outbound call to a backing store.
    pub upstream_timeout: Duration,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `TELEGATE_PORT` or `TELEGATE_UPSTREAM_TIMEOUT_SECS`
    /// is set but cannot be parsed as a number.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("TELEGATE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("TELEGATE_PORT")
            .ok()
            .map(|p| p.parse::<u16>())
            .transpose()?
            .unwrap_or(3001);

        let timeout_secs = std::env::var("TELEGATE_UPSTREAM_TIMEOUT_SECS")
            .ok()
            .map(|t| t.parse::<u64>())
            .transpose()?
            .unwrap_or(5);

        Ok(Self {
            host,
            port,
            prometheus_url: base_url_from_env("TELEGATE_PROMETHEUS_URL", "http://localhost:9090"),
            jaeger_url: base_url_from_env("TELEGATE_JAEGER_URL", "http://localhost:16686"),
            elasticsearch_url: base_url_from_env(
                "TELEGATE_ELASTICSEARCH_URL",
                "http://localhost:9200",
            ),
            upstream_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Returns the socket address for binding.
    ///
    /// # Panics
    ///
    /// Panics if the host and port combination cannot be parsed as a valid socket address.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address from config")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            prometheus_url: "http://localhost:9090".to_string(),
            jaeger_url: "http://localhost:16686".to_string(),
            elasticsearch_url: "http://localhost:9200".to_string(),
            upstream_timeout: Duration::from_secs(5),
        }
    }
}

/// Reads a base URL from the environment, trimming any trailing slash so that
/// path concatenation stays predictable.
fn base_url_from_env(var: &str, default: &str) -> String {
    std::env::var(var)
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| default.to_string())
}
