//! In-memory store adapter for tests and local development.
//!
//! Implements the same conditional-write semantics as the etcd adapter,
//! with the whole map behind one lock so a compare-and-swap observes and
//! applies in a single critical section.

use super::SeedStore;
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeedStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: &str,
    ) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;
        let matches = match (entries.get(key), expected) {
            (None, None) => true,
            (Some(current), Some(expected)) => current == expected,
            _ => false,
        };
        if matches {
            entries.insert(key.to_string(), new.to_string());
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_absent_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_then_get_roundtrips() {
        let store = MemoryStore::new();
        store.put("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn cas_creates_only_when_absent() {
        let store = MemoryStore::new();
        assert!(store.compare_and_swap("k", None, "v1").await.unwrap());
        // Key now exists, so a second create must lose.
        assert!(!store.compare_and_swap("k", None, "v2").await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn cas_swaps_only_on_matching_value() {
        let store = MemoryStore::new();
        store.put("k", "v1").await.unwrap();
        assert!(!store.compare_and_swap("k", Some("stale"), "v2").await.unwrap());
        assert!(store.compare_and_swap("k", Some("v1"), "v2").await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn cas_with_expected_value_fails_on_absent_key() {
        let store = MemoryStore::new();
        assert!(!store.compare_and_swap("k", Some("v1"), "v2").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
