//! Bootseed Server - Seed Registry for Data-Store Cluster Bootstrap

use anyhow::Context;
use bootseed_registry::store::EtcdStore;
use bootseed_registry::SeedRegistry;
use bootseed_server::{api, config::ServerConfig, observability, version};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init_tracing(observability::TracingConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let config = ServerConfig::from_env();

    info!(version = %version::full_version(), "Starting bootseed server...");
    info!("Node ID: {}", config.node_id);
    info!("Etcd endpoints: {:?}", config.etcd_endpoints);
    info!("Bind address: {}", config.bind_addr);

    let metrics_state = observability::init_metrics()
        .map_err(|e| anyhow::anyhow!("failed to initialize metrics: {e}"))?;

    // Connect to etcd
    info!("Connecting to etcd...");
    let store = Arc::new(
        EtcdStore::connect(
            config.etcd_endpoints.clone(),
            &config.etcd_backoff(),
            config.store_op_timeout,
        )
        .await
        .context("etcd connection failed")?,
    );
    store.status().await.context("etcd status check failed")?;
    info!("Connected to etcd");

    let registry = Arc::new(
        SeedRegistry::new(store.clone(), config.namespace.clone())
            .with_cas_retries(config.cas_retries),
    );

    // Ready as soon as the store connection is verified: the registry is
    // stateless, there is nothing else to converge.
    let readiness = Arc::new(AtomicBool::new(false));
    readiness.store(true, Ordering::Release);

    let state = api::AppState {
        registry,
        store,
        node_id: config.node_id.clone(),
        default_max_seeds: config.default_max_seeds,
        metrics_state: Some(metrics_state),
        readiness,
    };

    let app = api::create_router(state);

    info!("Starting API server on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("failed to bind API listener")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("API server failed")?;

    observability::shutdown_tracing();
    Ok(())
}
