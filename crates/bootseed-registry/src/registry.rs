//! Seed registry join/lookup protocol.
//!
//! Many nodes may join the same cluster at the same instant, against the
//! same shared store, from independent registry instances. A naive
//! read-modify-write would let one writer clobber another's addition, so
//! every mutation here is a conditional write against the exact value read:
//! if another writer committed in between, the write fails and the whole
//! decision is re-made from a fresh read. The retry loop is bounded; the
//! stored list is never left partially written.

use crate::error::RegistryError;
use crate::seedlist::SeedList;
use crate::store::{seeds_key, SeedStore};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default bound on conditional-write retries per join.
///
/// Large enough that a full complement of legitimate concurrent joiners
/// converges, small enough to fail fast under pathological contention.
pub const DEFAULT_CAS_RETRIES: u32 = 8;

/// How a successful join left the cluster's seed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinStatus {
    /// First seed of a previously unknown cluster.
    Bootstrapped,
    /// Appended to an existing list.
    Joined,
    /// The node was already a member; list unchanged.
    AlreadyMember,
    /// The list was at capacity; list unchanged.
    CapacityReached,
}

impl JoinStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinStatus::Bootstrapped => "bootstrapped",
            JoinStatus::Joined => "joined",
            JoinStatus::AlreadyMember => "already_member",
            JoinStatus::CapacityReached => "capacity_reached",
        }
    }
}

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// The cluster's seed list after the call, insertion order preserved.
    pub seeds: Vec<String>,
    pub status: JoinStatus,
}

/// Per-cluster seed registry over a shared key-value store.
///
/// The registry is stateless: all coordination is delegated to the store's
/// conditional write, so any number of registry instances can run against
/// the same store concurrently.
pub struct SeedRegistry {
    store: Arc<dyn SeedStore>,
    namespace: String,
    cas_retries: u32,
}

impl SeedRegistry {
    pub fn new(store: Arc<dyn SeedStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            cas_retries: DEFAULT_CAS_RETRIES,
        }
    }

    /// Override the conditional-write retry budget.
    pub fn with_cas_retries(mut self, cas_retries: u32) -> Self {
        self.cas_retries = cas_retries;
        self
    }

    /// Register `node_ip` as a seed for `cluster_name` and return the
    /// current seed list.
    ///
    /// Joining is idempotent: an address already in the list is returned
    /// as-is, never duplicated. A list that has reached `max_seeds` accepts
    /// no further addresses, not even from new nodes.
    ///
    /// `max_seeds` is supplied per call and never stored, so callers that
    /// disagree on the capacity will observe different caps over time. That
    /// is a property of the protocol as deployed, kept here deliberately
    /// rather than silently changed to a per-cluster setting.
    pub async fn join(
        &self,
        cluster_name: &str,
        node_ip: &str,
        max_seeds: usize,
    ) -> Result<JoinOutcome, RegistryError> {
        if cluster_name.is_empty() {
            return Err(RegistryError::InvalidArgument(
                "cluster name must not be empty".to_string(),
            ));
        }
        if node_ip.parse::<IpAddr>().is_err() {
            return Err(RegistryError::InvalidArgument(format!(
                "'{node_ip}' is not a valid IP address"
            )));
        }
        if max_seeds < 1 {
            return Err(RegistryError::InvalidArgument(
                "max_seeds must be at least 1".to_string(),
            ));
        }

        let key = seeds_key(&self.namespace, cluster_name);

        for attempt in 1..=self.cas_retries {
            let current = self.store.get(&key).await?;

            match current.as_deref() {
                // No list yet (or an empty placeholder): this caller is the
                // cluster's first seed.
                None | Some("") => {
                    if self
                        .store
                        .compare_and_swap(&key, current.as_deref(), node_ip)
                        .await?
                    {
                        debug!(
                            cluster = %cluster_name,
                            node_ip = %node_ip,
                            "Bootstrapped seed list"
                        );
                        return Ok(JoinOutcome {
                            seeds: vec![node_ip.to_string()],
                            status: JoinStatus::Bootstrapped,
                        });
                    }
                }
                Some(raw) => {
                    let mut seeds = SeedList::parse(raw);

                    if seeds.contains(node_ip) {
                        return Ok(JoinOutcome {
                            seeds: seeds.into_members(),
                            status: JoinStatus::AlreadyMember,
                        });
                    }

                    if seeds.len() >= max_seeds {
                        debug!(
                            cluster = %cluster_name,
                            node_ip = %node_ip,
                            seed_count = seeds.len(),
                            max_seeds,
                            "Seed list at capacity, not registering"
                        );
                        return Ok(JoinOutcome {
                            seeds: seeds.into_members(),
                            status: JoinStatus::CapacityReached,
                        });
                    }

                    seeds.push(node_ip);
                    if self
                        .store
                        .compare_and_swap(&key, Some(raw), &seeds.encode())
                        .await?
                    {
                        debug!(
                            cluster = %cluster_name,
                            node_ip = %node_ip,
                            seed_count = seeds.len(),
                            "Registered seed"
                        );
                        return Ok(JoinOutcome {
                            seeds: seeds.into_members(),
                            status: JoinStatus::Joined,
                        });
                    }
                }
            }

            // Another writer committed between our read and our write.
            // Re-read and re-decide: the newcomer may already be present
            // now, or the list may have filled up.
            warn!(
                cluster = %cluster_name,
                node_ip = %node_ip,
                attempt,
                "Concurrent seed list update detected, retrying"
            );
        }

        Err(RegistryError::Conflict {
            cluster: cluster_name.to_string(),
            attempts: self.cas_retries,
        })
    }

    /// Read the current seed list for `cluster_name`.
    ///
    /// Returns an empty list for an unknown cluster and never creates a
    /// store entry.
    pub async fn list(&self, cluster_name: &str) -> Result<Vec<String>, RegistryError> {
        if cluster_name.is_empty() {
            return Err(RegistryError::InvalidArgument(
                "cluster name must not be empty".to_string(),
            ));
        }

        let key = seeds_key(&self.namespace, cluster_name);
        let current = self.store.get(&key).await?;
        Ok(current
            .as_deref()
            .map(SeedList::parse)
            .unwrap_or_default()
            .into_members())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    fn registry() -> SeedRegistry {
        SeedRegistry::new(Arc::new(MemoryStore::new()), "test")
    }

    #[tokio::test]
    async fn first_join_bootstraps_cluster() {
        let registry = registry();
        let outcome = registry.join("clusterX", "10.0.0.1", 2).await.unwrap();
        assert_eq!(outcome.seeds, ["10.0.0.1"]);
        assert_eq!(outcome.status, JoinStatus::Bootstrapped);
    }

    #[tokio::test]
    async fn join_is_idempotent() {
        let registry = registry();
        registry.join("clusterX", "10.0.0.1", 2).await.unwrap();
        let first = registry.join("clusterX", "10.0.0.2", 2).await.unwrap();
        let second = registry.join("clusterX", "10.0.0.2", 2).await.unwrap();
        assert_eq!(first.seeds, second.seeds);
        assert_eq!(second.status, JoinStatus::AlreadyMember);
        assert_eq!(second.seeds, ["10.0.0.1", "10.0.0.2"]);
    }

    #[tokio::test]
    async fn join_rejects_above_capacity() {
        let registry = registry();
        registry.join("clusterX", "10.0.0.1", 2).await.unwrap();
        registry.join("clusterX", "10.0.0.2", 2).await.unwrap();

        let outcome = registry.join("clusterX", "10.0.0.3", 2).await.unwrap();
        assert_eq!(outcome.status, JoinStatus::CapacityReached);
        assert_eq!(outcome.seeds, ["10.0.0.1", "10.0.0.2"]);
    }

    #[tokio::test]
    async fn capacity_is_supplied_per_call() {
        let registry = registry();
        registry.join("clusterX", "10.0.0.1", 2).await.unwrap();
        registry.join("clusterX", "10.0.0.2", 2).await.unwrap();

        // A later caller with a larger cap can still get in.
        let outcome = registry.join("clusterX", "10.0.0.3", 3).await.unwrap();
        assert_eq!(outcome.status, JoinStatus::Joined);
        assert_eq!(outcome.seeds.len(), 3);
    }

    #[tokio::test]
    async fn join_preserves_insertion_order() {
        let registry = registry();
        registry.join("clusterX", "10.0.0.1", 3).await.unwrap();
        registry.join("clusterX", "10.0.0.2", 3).await.unwrap();
        registry.join("clusterX", "10.0.0.3", 3).await.unwrap();

        let seeds = registry.list("clusterX").await.unwrap();
        assert_eq!(seeds, ["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
    }

    #[tokio::test]
    async fn concurrent_joins_lose_no_updates() {
        let registry = Arc::new(SeedRegistry::new(Arc::new(MemoryStore::new()), "test"));

        let mut handles = Vec::new();
        for i in 0..8 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.join("clusterX", &format!("10.0.0.{i}"), 8).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let seeds = registry.list("clusterX").await.unwrap();
        assert_eq!(seeds.len(), 8, "every concurrent join must survive");
        for i in 0..8 {
            assert!(seeds.contains(&format!("10.0.0.{i}")));
        }
    }

    #[tokio::test]
    async fn clusters_are_independent() {
        let registry = registry();
        registry.join("clusterA", "10.0.0.1", 2).await.unwrap();
        registry.join("clusterB", "10.0.1.1", 2).await.unwrap();

        assert_eq!(registry.list("clusterA").await.unwrap(), ["10.0.0.1"]);
        assert_eq!(registry.list("clusterB").await.unwrap(), ["10.0.1.1"]);
    }

    #[tokio::test]
    async fn list_of_unknown_cluster_is_empty_and_creates_nothing() {
        let store = Arc::new(MemoryStore::new());
        let registry = SeedRegistry::new(store.clone(), "test");

        assert!(registry.list("clusterX").await.unwrap().is_empty());
        assert!(registry.list("clusterX").await.unwrap().is_empty());

        // The read must not have materialized an entry.
        assert_eq!(store.get(&seeds_key("test", "clusterX")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn join_validates_arguments_before_touching_store() {
        let registry = registry();

        let err = registry.join("", "10.0.0.1", 2).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument(_)));

        let err = registry.join("clusterX", "not-an-ip", 2).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument(_)));

        let err = registry.join("clusterX", "10.0.0.1", 0).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument(_)));

        // None of the rejected calls may have created the cluster.
        assert!(registry.list("clusterX").await.unwrap().is_empty());
    }

    /// Store whose conditional writes always lose, as if a faster writer
    /// committed every time.
    struct ContendedStore;

    #[async_trait]
    impl SeedStore for ContendedStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(Some("10.0.0.1".to_string()))
        }

        async fn put(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Ok(())
        }

        async fn compare_and_swap(
            &self,
            _key: &str,
            _expected: Option<&str>,
            _new: &str,
        ) -> Result<bool, StoreError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn exhausted_retry_budget_reports_conflict() {
        let registry =
            SeedRegistry::new(Arc::new(ContendedStore), "test").with_cas_retries(3);

        let err = registry.join("clusterX", "10.0.0.2", 4).await.unwrap_err();
        match err {
            RegistryError::Conflict { cluster, attempts } => {
                assert_eq!(cluster, "clusterX");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn contended_join_still_short_circuits_on_membership() {
        // Even under permanent contention, an address already in the list
        // returns without writing.
        let registry =
            SeedRegistry::new(Arc::new(ContendedStore), "test").with_cas_retries(3);

        let outcome = registry.join("clusterX", "10.0.0.1", 4).await.unwrap();
        assert_eq!(outcome.status, JoinStatus::AlreadyMember);
    }

    struct DownStore;

    #[async_trait]
    impl SeedStore for DownStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        async fn put(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        async fn compare_and_swap(
            &self,
            _key: &str,
            _expected: Option<&str>,
            _new: &str,
        ) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn store_outage_propagates_without_retry() {
        let registry = SeedRegistry::new(Arc::new(DownStore), "test");

        let err = registry.join("clusterX", "10.0.0.1", 2).await.unwrap_err();
        assert!(matches!(err, RegistryError::Store(StoreError::Unavailable(_))));

        let err = registry.list("clusterX").await.unwrap_err();
        assert!(matches!(err, RegistryError::Store(StoreError::Unavailable(_))));
    }
}
