//! Etcd-backed store adapter.
//!
//! Conditional writes map onto etcd transactions: the expected-value guard
//! becomes a `Compare::value` condition, and create-if-absent becomes a
//! `create_revision == 0` condition. Every operation is bounded by a
//! per-call timeout; timeouts and transport failures both surface as
//! [`StoreError::Unavailable`].

use super::SeedStore;
use crate::error::StoreError;
use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use etcd_client::{Client, Compare, CompareOp, Txn, TxnOp};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Backoff settings for the initial etcd connection.
#[derive(Debug, Clone)]
pub struct EtcdBackoff {
    /// Initial interval for connection retry
    pub initial_interval: Duration,
    /// Maximum interval for connection retry
    pub max_interval: Duration,
    /// Maximum elapsed time before giving up
    pub max_elapsed: Duration,
    /// Interval multiplier per attempt
    pub multiplier: f64,
}

impl Default for EtcdBackoff {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(10),
            max_elapsed: Duration::from_secs(60),
            multiplier: 2.0,
        }
    }
}

/// Etcd store adapter.
///
/// The inner client is a cheap handle onto a shared connection; methods
/// clone it per call because the etcd API wants exclusive access.
pub struct EtcdStore {
    client: Client,
    op_timeout: Duration,
}

impl EtcdStore {
    /// Connect to etcd with exponential backoff.
    pub async fn connect(
        endpoints: Vec<String>,
        backoff_cfg: &EtcdBackoff,
        op_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let backoff = ExponentialBackoff {
            initial_interval: backoff_cfg.initial_interval,
            max_interval: backoff_cfg.max_interval,
            max_elapsed_time: Some(backoff_cfg.max_elapsed),
            multiplier: backoff_cfg.multiplier,
            ..Default::default()
        };

        let client = retry(backoff, || async {
            match Client::connect(&endpoints, None).await {
                Ok(client) => {
                    debug!("Connected to etcd");
                    Ok(client)
                }
                Err(e) => {
                    warn!(error = %e, "etcd connection failed, retrying");
                    Err(backoff::Error::transient(e))
                }
            }
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("etcd connect failed after retries: {e}")))?;

        Ok(Self { client, op_timeout })
    }

    /// Verify the etcd connection is healthy. Used by liveness probes.
    pub async fn status(&self) -> Result<(), StoreError> {
        let mut client = self.client.clone();
        self.timed(async move { client.status().await }).await?;
        Ok(())
    }

    async fn timed<T, E>(
        &self,
        fut: impl Future<Output = Result<T, E>>,
    ) -> Result<T, StoreError>
    where
        E: std::fmt::Display,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(StoreError::Unavailable(e.to_string())),
            Err(_) => Err(StoreError::Unavailable(format!(
                "etcd operation timed out after {:?}",
                self.op_timeout
            ))),
        }
    }
}

#[async_trait]
impl SeedStore for EtcdStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut client = self.client.clone();
        let key = key.to_string();
        let resp = self.timed(async move { client.get(key, None).await }).await?;

        match resp.kvs().first() {
            Some(kv) => {
                let value = kv
                    .value_str()
                    .map_err(|e| StoreError::Unavailable(format!("unreadable value: {e}")))?;
                Ok(Some(value.to_string()))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut client = self.client.clone();
        let key = key.to_string();
        let value = value.to_string();
        self.timed(async move { client.put(key, value, None).await })
            .await?;
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: &str,
    ) -> Result<bool, StoreError> {
        let guard = match expected {
            Some(value) => Compare::value(key, CompareOp::Equal, value),
            None => Compare::create_revision(key, CompareOp::Equal, 0),
        };
        let txn = Txn::new()
            .when(vec![guard])
            .and_then(vec![TxnOp::put(key, new, None)]);

        let mut client = self.client.clone();
        let resp = self.timed(async move { client.txn(txn).await }).await?;
        Ok(resp.succeeded())
    }
}
