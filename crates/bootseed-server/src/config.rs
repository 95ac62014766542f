//! Server Configuration
//!
//! Centralized configuration for the seed registry service with environment
//! variable overrides. Configuration is built once at startup and passed
//! into component constructors; there is no process-global mutable state.

use bootseed_registry::store::EtcdBackoff;
use std::time::Duration;

/// Server configuration with sensible defaults
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP bind address (env: BIND_ADDR)
    pub bind_addr: String,

    /// Etcd endpoints (env: ETCD_ENDPOINTS, comma-separated)
    pub etcd_endpoints: Vec<String>,

    /// Key namespace for seed lists (env: SEED_NAMESPACE)
    pub namespace: String,

    /// Node identifier used in logs (env: NODE_ID)
    pub node_id: String,

    /// Timeout applied to each individual store operation
    pub store_op_timeout: Duration,

    /// Bound on conditional-write retries per join (env: CAS_RETRIES)
    pub cas_retries: u32,

    /// Capacity applied when a join request omits max_seeds
    /// (env: DEFAULT_MAX_SEEDS)
    pub default_max_seeds: usize,

    // Etcd connection backoff settings
    /// Initial interval for etcd connection retry
    pub etcd_backoff_initial: Duration,

    /// Maximum interval for etcd connection retry
    pub etcd_backoff_max: Duration,

    /// Maximum elapsed time for etcd connection retries
    pub etcd_backoff_max_elapsed: Duration,

    /// Multiplier for etcd backoff
    pub etcd_backoff_multiplier: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            etcd_endpoints: vec!["http://127.0.0.1:2379".to_string()],
            namespace: "bootseed".to_string(),
            node_id: format!("bootseed-node-{}", uuid::Uuid::new_v4()),
            store_op_timeout: Duration::from_secs(2),
            cas_retries: bootseed_registry::DEFAULT_CAS_RETRIES,
            default_max_seeds: 2,
            etcd_backoff_initial: Duration::from_secs(1),
            etcd_backoff_max: Duration::from_secs(10),
            etcd_backoff_max_elapsed: Duration::from_secs(60),
            etcd_backoff_multiplier: 2.0,
        }
    }
}

impl ServerConfig {
    /// Create configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(bind_addr) = std::env::var("BIND_ADDR") {
            config.bind_addr = bind_addr;
        }

        if let Ok(endpoints) = std::env::var("ETCD_ENDPOINTS") {
            config.etcd_endpoints = endpoints.split(',').map(String::from).collect();
        }

        if let Ok(namespace) = std::env::var("SEED_NAMESPACE") {
            config.namespace = namespace;
        }

        if let Ok(node_id) = std::env::var("NODE_ID") {
            config.node_id = node_id;
        }

        if let Ok(retries) = std::env::var("CAS_RETRIES") {
            if let Ok(parsed) = retries.parse::<u32>() {
                config.cas_retries = parsed;
            }
        }

        if let Ok(max_seeds) = std::env::var("DEFAULT_MAX_SEEDS") {
            if let Ok(parsed) = max_seeds.parse::<usize>() {
                config.default_max_seeds = parsed;
            }
        }

        config
    }

    /// Backoff settings for the initial etcd connection.
    pub fn etcd_backoff(&self) -> EtcdBackoff {
        EtcdBackoff {
            initial_interval: self.etcd_backoff_initial,
            max_interval: self.etcd_backoff_max,
            max_elapsed: self.etcd_backoff_max_elapsed,
            multiplier: self.etcd_backoff_multiplier,
        }
    }
}
