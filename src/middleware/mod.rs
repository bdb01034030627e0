//! Axum middleware for rate limiting.
//!
//! Provides a Tower-compatible layer that derives the client identity,
//! records the request against the shared counter store, and either rejects
//! with `429 Too Many Requests` or forwards the request with usage metadata
//! headers attached for downstream reporting.
//!
//! # Example
//!
//! ```ignore
//! use axum::Router;
//! use quotagate::{
//!     middleware::RateLimitLayer,
//!     identity::PeerIpIdentity,
//!     FixedWindowLimiter, MemoryStore, Quota,
//! };
//!
//! let limiter = FixedWindowLimiter::new(MemoryStore::new(), Quota::per_minute(60));
//!
//! let app: Router = Router::new()
//!     .fallback(handler)
//!     .layer(RateLimitLayer::new(limiter, PeerIpIdentity::new()));
//! ```

mod layer;

pub use layer::{AxumRequest, RateLimitLayer, RateLimitService};

use crate::identity::HasHeaders;

impl HasHeaders for http::HeaderMap {
    fn header(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }
}
