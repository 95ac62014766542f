//! Application State
//!
//! Shared state passed to all API handlers.

use crate::observability::metrics::MetricsState;
use bootseed_registry::store::EtcdStore;
use bootseed_registry::SeedRegistry;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The seed registry protocol, shared across handlers
    pub registry: Arc<SeedRegistry>,
    /// Direct store handle, used by the liveness probe
    pub store: Arc<EtcdStore>,
    pub node_id: String,
    /// Capacity applied when a join request omits max_seeds
    pub default_max_seeds: usize,
    pub metrics_state: Option<MetricsState>,
    pub readiness: Arc<AtomicBool>,
}
