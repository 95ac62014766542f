//! Store adapter over the shared key-value store.
//!
//! The registry needs three operations from the store: a plain read, an
//! unconditional write, and an atomic conditional write. All coordination
//! between concurrent registry instances is delegated to the conditional
//! write; the adapter holds no state of its own and caches nothing.

mod etcd;
mod memory;

pub use etcd::{EtcdBackoff, EtcdStore};
pub use memory::MemoryStore;

use crate::error::StoreError;
use async_trait::async_trait;

/// Store key for a cluster's seed list.
pub fn seeds_key(namespace: &str, cluster_name: &str) -> String {
    format!("{namespace}:{cluster_name}:seeds")
}

/// Minimal interface over the shared key-value store.
///
/// Successful writes are immediately visible to every other caller of the
/// same store instance.
#[async_trait]
pub trait SeedStore: Send + Sync {
    /// Read the value for `key`, or `None` if unset.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Unconditionally overwrite the value for `key`.
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Atomically replace the value for `key` with `new`, but only if the
    /// current value still matches `expected` at the moment of the call.
    /// `expected = None` means the key must not exist yet. Returns whether
    /// the swap applied.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: &str,
    ) -> Result<bool, StoreError>;
}
