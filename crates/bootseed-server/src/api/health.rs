//! Health Check Endpoints
//!
//! Liveness and readiness probe handlers for Kubernetes.

use super::state::AppState;
use axum::{extract::State, http::StatusCode};

/// Liveness probe endpoint. Verifies the backing store is reachable.
/// The store adapter bounds the check with its own operation timeout.
#[tracing::instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Result<&'static str, StatusCode> {
    match state.store.status().await {
        Ok(()) => Ok("OK"),
        Err(e) => {
            tracing::warn!(error = %e, "store health check failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Readiness probe endpoint. Returns OK once the store connection has been
/// verified at startup.
#[tracing::instrument(skip(state))]
pub async fn readiness_check(State(state): State<AppState>) -> Result<&'static str, StatusCode> {
    if state.readiness.load(std::sync::atomic::Ordering::Acquire) {
        Ok("READY")
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
