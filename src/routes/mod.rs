//! API route definitions.
//!
//! This module organizes all HTTP routes for the telemetry gateway.

mod health;
mod logs;
mod metrics;
mod status;
mod traces;

pub use health::health_routes;
pub use logs::logs_routes;
pub use metrics::metrics_routes;
pub use status::status_routes;
pub use traces::traces_routes;
