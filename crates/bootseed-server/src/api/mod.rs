//! HTTP API Module
//!
//! REST API endpoints for the bootseed server.
//!
//! This module contains:
//! - `state`: Shared application state
//! - `health`: Liveness and readiness probes
//! - `metrics`: Prometheus metrics endpoint
//! - `seeds`: Seed registry join/list endpoints and remote-address echo

mod health;
mod metrics;
mod seeds;
mod state;

pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};

/// Create the API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Service banner
        .route("/", get(seeds::index))
        // Health checks
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Observability
        .route("/metrics", get(metrics::get_metrics))
        // Seed registry
        .route(
            "/v1/clusters/{cluster}/seeds",
            post(seeds::join_cluster).get(seeds::list_seeds),
        )
        .route("/v1/rpc-address", get(seeds::rpc_address))
        .with_state(state)
}
