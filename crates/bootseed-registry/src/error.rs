//! Error taxonomy for store and registry operations.

use thiserror::Error;

/// Failure of the backing key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached, timed out, or returned an
    /// unreadable value. Transient; the caller decides on retry/backoff.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a registry operation.
///
/// Callers can always tell "bad input" apart from "store down" apart from
/// "too many concurrent writers, try again".
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Malformed input. Reported immediately, never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The conditional-write retry budget was exhausted under contention.
    /// The stored list is left in a valid state from some prior successful
    /// write; the whole call is safe to retry.
    #[error("join for cluster '{cluster}' lost {attempts} consecutive conditional writes")]
    Conflict { cluster: String, attempts: u32 },

    /// The backing store failed. Propagated as-is, not retried here.
    #[error(transparent)]
    Store(#[from] StoreError),
}
