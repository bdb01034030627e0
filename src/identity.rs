//! Client identity extraction.
//!
//! The identity determines which principal a request is counted against.
//! Extractors are generic over any request type that exposes the needed
//! data through the capability traits below.
//!
//! Returning `None` from an extractor means the caller could not derive a
//! stable identity; the middleware treats that as a precondition failure and
//! answers with a service error without consulting the store.
//!
//! # Example
//!
//! ```ignore
//! use quotagate::identity::{Identity, PeerIpIdentity, HeaderIdentity};
//!
//! // Count per transport peer IP
//! let by_ip = PeerIpIdentity::new();
//!
//! // Count per API key
//! let by_key = HeaderIdentity::api_key();
//! ```

use std::net::SocketAddr;

/// Trait for deriving the rate-limited principal from a request.
///
/// # Type Parameters
///
/// - `R`: The request type (e.g., a wrapped `axum` request)
pub trait Identity<R>: Send + Sync + 'static {
    /// Extract a client identity from the request.
    ///
    /// Returns `None` if no stable identity can be derived.
    fn extract(&self, request: &R) -> Option<String>;

    /// Get the extractor name for logging.
    fn name(&self) -> &'static str;
}

// ============================================================================
// Request Capability Traits
// ============================================================================

/// Trait for requests that expose the transport-layer peer address.
pub trait HasPeerAddr {
    /// Get the peer socket address of the underlying connection.
    fn peer_addr(&self) -> Option<SocketAddr>;
}

/// Trait for requests that have headers.
pub trait HasHeaders {
    /// Get a header value by lowercase name.
    fn header(&self, name: &str) -> Option<&str>;
}

// ============================================================================
// IP-based Extractors
// ============================================================================

/// Identity from the transport peer's IP address.
///
/// Uses the connection's peer address with the port stripped, so all
/// requests from one network origin share a quota.
#[derive(Debug, Clone, Default)]
pub struct PeerIpIdentity;

impl PeerIpIdentity {
    /// Create a new peer IP extractor.
    pub fn new() -> Self {
        Self
    }
}

impl<R: HasPeerAddr> Identity<R> for PeerIpIdentity {
    fn extract(&self, request: &R) -> Option<String> {
        request.peer_addr().map(|addr| addr.ip().to_string())
    }

    fn name(&self) -> &'static str {
        "peer_ip"
    }
}

/// Identity from proxy forwarding headers, falling back to the peer IP.
///
/// Checks the first hop of `x-forwarded-for`, then `x-real-ip`, then the
/// transport peer address. Use this behind a trusted reverse proxy.
#[derive(Debug, Clone, Default)]
pub struct ForwardedIpIdentity;

impl ForwardedIpIdentity {
    /// Create a new forwarded IP extractor.
    pub fn new() -> Self {
        Self
    }
}

impl<R> Identity<R> for ForwardedIpIdentity
where
    R: HasPeerAddr + HasHeaders,
{
    fn extract(&self, request: &R) -> Option<String> {
        if let Some(forwarded) = request.header("x-forwarded-for") {
            let first = forwarded.split(',').next()?.trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
        if let Some(real_ip) = request.header("x-real-ip") {
            let real_ip = real_ip.trim();
            if !real_ip.is_empty() {
                return Some(real_ip.to_string());
            }
        }
        request.peer_addr().map(|addr| addr.ip().to_string())
    }

    fn name(&self) -> &'static str {
        "forwarded_ip"
    }
}

// ============================================================================
// Header-based Extractors
// ============================================================================

/// Identity from a specific header value.
#[derive(Debug, Clone)]
pub struct HeaderIdentity {
    header_name: &'static str,
}

impl HeaderIdentity {
    /// Create a new header identity extractor.
    pub fn new(header_name: &'static str) -> Self {
        Self { header_name }
    }

    /// Extract from the Authorization header.
    pub fn authorization() -> Self {
        Self::new("authorization")
    }

    /// Extract from the X-API-Key header.
    pub fn api_key() -> Self {
        Self::new("x-api-key")
    }
}

impl<R: HasHeaders> Identity<R> for HeaderIdentity {
    fn extract(&self, request: &R) -> Option<String> {
        request.header(self.header_name).map(|v| v.to_string())
    }

    fn name(&self) -> &'static str {
        "header"
    }
}

// ============================================================================
// Fixed and Closure-based Extractors
// ============================================================================

/// An identity that is always the same value.
///
/// Useful for global limits and for tests.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    identity: String,
}

impl StaticIdentity {
    /// Create a new static identity.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
        }
    }
}

impl<R> Identity<R> for StaticIdentity {
    fn extract(&self, _request: &R) -> Option<String> {
        Some(self.identity.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// A closure-based identity extractor.
#[derive(Clone)]
pub struct FnIdentity<F> {
    extractor: F,
    name: &'static str,
}

impl<F> std::fmt::Debug for FnIdentity<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnIdentity").field("name", &self.name).finish()
    }
}

impl<F> FnIdentity<F> {
    /// Create a new closure-based extractor.
    pub fn new(name: &'static str, extractor: F) -> Self {
        Self { extractor, name }
    }
}

impl<R, F> Identity<R> for FnIdentity<F>
where
    F: Fn(&R) -> Option<String> + Send + Sync + 'static,
{
    fn extract(&self, request: &R) -> Option<String> {
        (self.extractor)(request)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
