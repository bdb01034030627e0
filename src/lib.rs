//! Distributed fixed-window rate limiting for Rust.
//!
//! `quotagate` enforces a per-client request quota over a sliding sequence of
//! fixed time windows, shared across every instance of a service:
//!
//! - **Fixed-Window Counting**: one atomic increment per request, epoch-anchored
//!   window boundaries deterministic across processes
//! - **Pluggable Counter Stores**: in-memory with expired-entry sweeping, Redis
//!   with connection pooling
//! - **Identity Extraction**: peer IP, forwarded IP, API key header, or custom
//! - **Usage Metadata**: limit/remaining headers propagated downstream for
//!   reporting endpoints
//! - **Framework Integration**: Axum/Tower middleware
//!
//! # Quick Start
//!
//! ```ignore
//! use quotagate::{FixedWindowLimiter, MemoryStore, Quota};
//!
//! #[tokio::main]
//! async fn main() {
//!     let limiter = FixedWindowLimiter::new(MemoryStore::new(), Quota::per_minute(60));
//!
//!     let decision = limiter.check_and_record("203.0.113.50").await.unwrap();
//!
//!     if decision.is_allowed() {
//!         println!("Request allowed! {} remaining", decision.info().remaining);
//!     } else {
//!         println!("Rate limited!");
//!     }
//! }
//! ```
//!
//! # Semantics
//!
//! Counting is fixed-window: requests are bucketed into `[w, w + D)` intervals
//! with `w = floor(now / D) * D`, and the counter resets at each boundary. A
//! client can therefore burst up to twice the ceiling across a boundary; that
//! is the accepted cost of needing only a single store round trip per request.
//! The rejected request still consumes a slot in the window's counter, so
//! rejection never resets a client's quota.
//!
//! On store failure the limiter fails closed: the caller answers with a
//! service error instead of silently admitting the request past the limit.
//!
//! # Feature Flags
//!
//! - `memory` (default): In-memory counter store with expired-entry sweeping
//! - `redis`: Redis counter store
//! - `axum`: Axum middleware integration

pub mod decision;
pub mod error;
pub mod headers;
pub mod identity;
pub mod limiter;
pub mod quota;
pub mod store;
pub mod window;

#[cfg(feature = "axum")]
pub mod middleware;

// Re-export main types
pub use decision::{Decision, UsageInfo};
pub use error::{ConfigError, RateLimitError, Result, StoreError, UsageError};
pub use identity::{
    FnIdentity, ForwardedIpIdentity, HeaderIdentity, Identity, PeerIpIdentity, StaticIdentity,
};
pub use limiter::FixedWindowLimiter;
pub use quota::Quota;
pub use store::CounterStore;
pub use window::{WindowKey, window_start};

// Re-export store types
#[cfg(feature = "memory")]
pub use store::{MemoryStore, SweepConfig, SweepInterval};

#[cfg(feature = "redis")]
pub use store::{RedisConfig, RedisStore};

#[cfg(feature = "axum")]
pub use middleware::RateLimitLayer;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::decision::{Decision, UsageInfo};
    pub use crate::error::{RateLimitError, Result};
    pub use crate::identity::{Identity, PeerIpIdentity};
    pub use crate::limiter::FixedWindowLimiter;
    pub use crate::quota::Quota;
    pub use crate::store::CounterStore;

    #[cfg(feature = "memory")]
    pub use crate::store::{MemoryStore, SweepConfig, SweepInterval};

    #[cfg(feature = "redis")]
    pub use crate::store::{RedisConfig, RedisStore};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "memory")]
    #[tokio::test]
    async fn test_integration_basic_flow() {
        use crate::prelude::*;

        let limiter = FixedWindowLimiter::new(MemoryStore::new(), Quota::per_hour(5));

        for i in 1..=5 {
            let decision = limiter.check_and_record("user:1").await.unwrap();
            assert!(decision.is_allowed(), "Request {} should be allowed", i);
            assert_eq!(decision.info().count, i);
        }

        let decision = limiter.check_and_record("user:1").await.unwrap();
        assert!(decision.is_denied());
        assert_eq!(decision.info().count, 6);
    }

    #[cfg(feature = "memory")]
    #[tokio::test]
    async fn test_integration_usage_headers() {
        let limiter = FixedWindowLimiter::new(MemoryStore::new(), Quota::per_hour(100));

        let decision = limiter.check_and_record("user:1").await.unwrap();
        let headers = decision.info().to_headers();

        assert!(headers
            .iter()
            .any(|(k, v)| *k == "x-rate-limit-limit" && v == "100"));
        assert!(headers
            .iter()
            .any(|(k, v)| *k == "x-rate-limit-remaining" && v == "99"));
    }

    #[cfg(feature = "memory")]
    #[tokio::test]
    async fn test_integration_shared_store_across_limiters() {
        use std::sync::Arc;

        // Two limiter instances over one store behave as one limiter, the
        // way two service replicas share a Redis.
        let store = Arc::new(MemoryStore::new());
        let a = FixedWindowLimiter::new(store.clone(), Quota::per_hour(10));
        let b = FixedWindowLimiter::new(store.clone(), Quota::per_hour(10));

        assert_eq!(a.record("client").await.unwrap(), 1);
        assert_eq!(b.record("client").await.unwrap(), 2);
        assert_eq!(a.record("client").await.unwrap(), 3);
    }
}
