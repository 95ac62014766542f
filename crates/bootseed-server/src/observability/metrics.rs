//! Prometheus Metrics
//!
//! Defines and initializes all Prometheus metrics for the bootseed server.
//!
//! Metrics tracked:
//! - `bootseed_join_total` - counter of join calls by outcome
//! - `bootseed_join_duration_seconds` - histogram of join handling times
//! - `bootseed_list_total` - counter of seed list reads
//! - `bootseed_seed_list_size` - gauge of seed list size per cluster

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// State containing the Prometheus handle for metrics export
#[derive(Clone)]
pub struct MetricsState {
    pub prometheus_handle: PrometheusHandle,
}

/// Initialize the Prometheus recorder, register all metric descriptions,
/// and return the handle used by the export endpoint.
pub fn init_metrics() -> Result<MetricsState, Box<dyn std::error::Error + Send + Sync>> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_metric_descriptions();

    Ok(MetricsState {
        prometheus_handle: handle,
    })
}

fn register_metric_descriptions() {
    describe_counter!(
        "bootseed_join_total",
        "Total number of join calls by outcome"
    );
    describe_histogram!(
        "bootseed_join_duration_seconds",
        "Duration of join calls in seconds"
    );
    describe_counter!("bootseed_list_total", "Total number of seed list reads");
    describe_gauge!(
        "bootseed_seed_list_size",
        "Current seed list size per cluster"
    );
}

/// Record the outcome of a join call (successful statuses and error kinds
/// share the same label space).
pub fn record_join(outcome: &str) {
    counter!("bootseed_join_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record how long a join call took, store round-trips included.
pub fn record_join_duration(duration: Duration) {
    histogram!("bootseed_join_duration_seconds").record(duration.as_secs_f64());
}

/// Record a seed list read
pub fn record_list() {
    counter!("bootseed_list_total").increment(1);
}

/// Update the seed list size gauge for a cluster
pub fn set_seed_list_size(cluster: &str, size: usize) {
    gauge!("bootseed_seed_list_size", "cluster" => cluster.to_string()).set(size as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_recording() {
        // These functions should not panic when called
        record_join("joined");
        record_join("conflict");
        record_join_duration(Duration::from_millis(5));
        record_list();
        set_seed_list_size("clusterX", 2);
    }
}
