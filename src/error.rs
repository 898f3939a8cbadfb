//! Gateway error taxonomy.
//!
//! Every fallible operation resolves to one of three cases: the caller omitted
//! a required parameter, an upstream store failed or returned garbage, or a
//! trace came back without an identifiable root span. Upstream details are
//! logged but never echoed to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Errors produced by gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The caller omitted a required parameter.
    #[error("{0}")]
    Validation(String),

    /// An upstream store was unreachable, returned a non-success status, or
    /// produced an unparseable body.
    #[error("query against {store} failed: {message}")]
    Query {
        /// Which backing store failed.
        store: &'static str,
        /// Diagnostic detail, logged but not sent to the caller.
        message: String,
    },

    /// A trace in the upstream response has no span without parent references,
    /// so no root span can be identified.
    #[error("trace {trace_id} has no root span")]
    MalformedTrace {
        /// The offending trace's ID.
        trace_id: String,
    },
}

impl GatewayError {
    /// Builds a [`GatewayError::Query`] for the given store.
    pub fn query(store: &'static str, message: impl Into<String>) -> Self {
        Self::Query {
            store,
            message: message.into(),
        }
    }
}

/// JSON body returned for failed requests.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            GatewayError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "missing_parameter",
                    message,
                },
            ),
            GatewayError::Query { store, message } => {
                tracing::error!(store, %message, "upstream query failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "upstream_error",
                        message: format!("Failed to fetch data from {store}"),
                    },
                )
            }
            GatewayError::MalformedTrace { trace_id } => {
                tracing::error!(%trace_id, "trace has no root span");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "malformed_trace",
                        message: "Trace store returned a trace without a root span".to_string(),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
