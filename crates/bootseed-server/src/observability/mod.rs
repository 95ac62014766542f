//! Observability Module
//!
//! - `metrics`: Prometheus metrics for join traffic and store contention
//! - `tracing`: subscriber setup with optional OpenTelemetry export

pub mod metrics;
pub mod tracing;

pub use metrics::{init_metrics, MetricsState};
pub use tracing::{init_tracing, shutdown_tracing, TracingConfig};
