//! Counter store trait and implementations.
//!
//! All mutable rate limiting state lives in the store; processes keep no
//! locally authoritative counters. The store is the single arbiter of
//! correctness across concurrently racing instances, which is why the trait
//! demands an atomic increment rather than read-modify-write primitives.

#[cfg(feature = "memory")]
mod memory;
#[cfg(feature = "redis")]
mod redis;

#[cfg(feature = "memory")]
pub use memory::{MemoryStore, SweepConfig, SweepInterval};

#[cfg(feature = "redis")]
pub use redis::{RedisConfig, RedisStore};

use std::future::Future;

use crate::error::Result;

/// Atomic counter store for window counters.
///
/// All operations are async to support both local and distributed backends.
/// Implementations must be thread-safe (`Send + Sync`).
///
/// # Required Operations
///
/// - `increment`: Atomically add 1 to a counter, returning the new value
/// - `expire_at`: Set an absolute expiry deadline on a counter
///
/// The atomic increment is the linchpin correctness property: two
/// simultaneous callers for the same key must never observe the same
/// post-increment value. Atomicity is delegated entirely to the store; no
/// local locking is layered on top.
pub trait CounterStore: Send + Sync + 'static {
    /// Atomically increment the counter for `key` by 1.
    ///
    /// A missing (or expired) counter is created with value 1. Returns the
    /// value AFTER incrementing.
    fn increment(&self, key: &str) -> impl Future<Output = Result<u64>> + Send;

    /// Set an absolute expiry on `key`, in Unix seconds.
    ///
    /// Idempotent: re-setting the same deadline is safe, and a missing key
    /// is not an error. Counters are reclaimed automatically once the
    /// deadline passes.
    fn expire_at(&self, key: &str, deadline_unix: u64) -> impl Future<Output = Result<()>> + Send;
}

impl<S: CounterStore + ?Sized> CounterStore for std::sync::Arc<S> {
    async fn increment(&self, key: &str) -> Result<u64> {
        (**self).increment(key).await
    }

    async fn expire_at(&self, key: &str, deadline_unix: u64) -> Result<()> {
        (**self).expire_at(key, deadline_unix).await
    }
}

impl<S: CounterStore + ?Sized> CounterStore for Box<S> {
    async fn increment(&self, key: &str) -> Result<u64> {
        (**self).increment(key).await
    }

    async fn expire_at(&self, key: &str, deadline_unix: u64) -> Result<()> {
        (**self).expire_at(key, deadline_unix).await
    }
}

/// Get the current time in whole Unix seconds.
pub fn current_unix_seconds() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}
