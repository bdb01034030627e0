//! Fixed-window rate limiting against a shared counter store.
//!
//! The limiter computes the epoch-anchored window for "now", atomically
//! increments the `(identity, window)` counter through the store, and
//! returns the post-increment count for the caller's admit/reject policy.
//!
//! Fixed-window counting costs one atomic primitive per request plus one
//! best-effort expiry set on the first request of each window. The accepted
//! trade-off is boundary bursting: a client can spend `max_rate` at the tail
//! of one window and `max_rate` at the head of the next without rejection.
//! That approximation is part of the behavioral contract; do not substitute
//! a sliding-window refinement here.

use std::time::SystemTime;

use crate::decision::Decision;
use crate::error::Result;
use crate::quota::Quota;
use crate::store::CounterStore;
use crate::window::{WindowKey, unix_seconds, window_start};

/// Fixed-window rate limiter.
///
/// Holds only read-only configuration; every counter lives in the injected
/// store, so any number of instances sharing one store agree on usage.
///
/// # Example
///
/// ```ignore
/// use quotagate::{FixedWindowLimiter, MemoryStore, Quota};
///
/// let limiter = FixedWindowLimiter::new(MemoryStore::new(), Quota::per_minute(60));
///
/// let decision = limiter.check_and_record("203.0.113.50").await?;
/// if decision.is_denied() {
///     // answer 429
/// }
/// ```
#[derive(Debug)]
pub struct FixedWindowLimiter<S> {
    store: S,
    quota: Quota,
}

impl<S: CounterStore> FixedWindowLimiter<S> {
    /// Create a limiter over `store` with the given quota.
    pub fn new(store: S, quota: Quota) -> Self {
        Self { store, quota }
    }

    /// Get the configured ceiling per window.
    pub fn max_rate(&self) -> u64 {
        self.quota.max_rate()
    }

    /// Get the quota.
    pub fn quota(&self) -> &Quota {
        &self.quota
    }

    /// Record a request for `identity` now and return the post-increment
    /// count for the current window.
    pub async fn record(&self, identity: &str) -> Result<u64> {
        self.record_at(identity, SystemTime::now()).await
    }

    /// Record a request for `identity` at `now`.
    ///
    /// Increments first, then sets the window expiry only when this call
    /// created the counter (returned value 1). Two first-of-window
    /// increments may race; both then set the identical deadline, which is
    /// harmless since `expire_at` is idempotent. Any store error propagates
    /// with no count; the increment is not rolled back and must not be
    /// blindly retried.
    pub async fn record_at(&self, identity: &str, now: SystemTime) -> Result<u64> {
        let window_secs = self.quota.window_secs();
        let start = window_start(unix_seconds(now), window_secs);
        let key = WindowKey::new(identity, start).to_string();

        let count = self.store.increment(&key).await?;
        if count == 1 {
            self.store.expire_at(&key, start + window_secs).await?;
        }

        tracing::debug!(%key, window = start, count, "recorded request");
        Ok(count)
    }

    /// Record a request now and apply the admit/reject policy.
    pub async fn check_and_record(&self, identity: &str) -> Result<Decision> {
        self.check_and_record_at(identity, SystemTime::now()).await
    }

    /// Record a request at `now` and apply the admit/reject policy.
    pub async fn check_and_record_at(&self, identity: &str, now: SystemTime) -> Result<Decision> {
        let count = self.record_at(identity, now).await?;
        Ok(Decision::evaluate(count, self.quota.max_rate()))
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::time::{Duration, UNIX_EPOCH};

    fn at(unix: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(unix)
    }

    #[tokio::test]
    async fn test_sequential_counts_are_strictly_increasing() {
        let limiter = FixedWindowLimiter::new(MemoryStore::new(), Quota::per_minute(100));
        let now = at(1_700_000_010);

        for expected in 1..=10 {
            let count = limiter.record_at("user", now).await.unwrap();
            assert_eq!(count, expected);
        }
    }

    #[tokio::test]
    async fn test_same_window_shares_a_counter() {
        let limiter = FixedWindowLimiter::new(MemoryStore::new(), Quota::per_minute(100));

        limiter.record_at("user", at(1_700_000_001)).await.unwrap();
        let count = limiter.record_at("user", at(1_700_000_059)).await.unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_window_rollover_restarts_count() {
        let limiter = FixedWindowLimiter::new(MemoryStore::new(), Quota::per_minute(100));

        limiter.record_at("user", at(1_700_000_010)).await.unwrap();
        limiter.record_at("user", at(1_700_000_020)).await.unwrap();

        // Next window has its own key.
        let count = limiter.record_at("user", at(1_700_000_060)).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_distinct_identities_are_isolated() {
        let limiter = FixedWindowLimiter::new(MemoryStore::new(), Quota::per_minute(100));
        let now = at(1_700_000_010);

        limiter.record_at("alice", now).await.unwrap();
        limiter.record_at("alice", now).await.unwrap();
        let count = limiter.record_at("bob", now).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_max_rate_accessor() {
        let limiter = FixedWindowLimiter::new(MemoryStore::new(), Quota::per_hour(10));
        assert_eq!(limiter.max_rate(), 10);
        assert_eq!(limiter.quota().window_secs(), 3600);
    }

    #[tokio::test]
    async fn test_check_and_record_policy() {
        let limiter = FixedWindowLimiter::new(MemoryStore::new(), Quota::per_minute(2));
        let now = at(1_700_000_010);

        let d1 = limiter.check_and_record_at("user", now).await.unwrap();
        assert!(d1.is_allowed());
        assert_eq!(d1.info().remaining, 1);

        let d2 = limiter.check_and_record_at("user", now).await.unwrap();
        assert!(d2.is_allowed());
        assert_eq!(d2.info().remaining, 0);

        let d3 = limiter.check_and_record_at("user", now).await.unwrap();
        assert!(d3.is_denied());
        // The rejected request still consumed a slot.
        assert_eq!(d3.info().count, 3);
    }

    #[tokio::test]
    async fn test_denied_requests_keep_counting() {
        let limiter = FixedWindowLimiter::new(MemoryStore::new(), Quota::per_minute(1));
        let now = at(1_700_000_010);

        limiter.check_and_record_at("user", now).await.unwrap();
        for expected in 2..=5 {
            let count = limiter.record_at("user", now).await.unwrap();
            assert_eq!(count, expected);
        }
    }
}
