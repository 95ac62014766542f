//! Seed registry for data-store cluster bootstrap
//!
//! When a new node joins a cluster it needs a small, stable set of "seed"
//! peer addresses to contact for gossip/join. This crate keeps that set in
//! a shared key-value store, one bounded and deduplicated list per cluster
//! name.
//!
//! This crate contains:
//! - `store`: the adapter over the shared key-value store (etcd-backed and
//!   in-memory implementations)
//! - `registry`: the join/lookup protocol with conditional-write conflict
//!   handling
//! - `seedlist`: the ordered, deduplicated list and its wire codec

mod error;
mod registry;
mod seedlist;
pub mod store;

pub use error::{RegistryError, StoreError};
pub use registry::{JoinOutcome, JoinStatus, SeedRegistry, DEFAULT_CAS_RETRIES};
pub use seedlist::SeedList;
