//! Error types for rate limiting operations.
//!
//! Every failure surfaces immediately as a typed error for the caller to map
//! to a transport-level response. The crate never retries internally: a
//! timed-out increment may already have applied on the store, so a blind
//! retry can double-count.

use thiserror::Error;

/// Result type for rate limiting operations.
pub type Result<T> = std::result::Result<T, RateLimitError>;

/// Main error type for rate limiting operations.
#[derive(Debug, Error)]
pub enum RateLimitError {
    /// The counter store could not be reached or failed mid-operation.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// The calling layer could not derive a stable client identity.
    ///
    /// This is a precondition failure of the caller; the store is never
    /// consulted when it occurs.
    #[error("Client identity unavailable: {0}")]
    IdentityUnavailable(String),

    /// Usage metadata on the reporting side is missing or non-numeric.
    #[error("Malformed usage metadata: {0}")]
    MalformedUsage(#[from] UsageError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Counter store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect to the store.
    #[error("Failed to connect: {0}")]
    ConnectionFailed(String),

    /// Connection pool exhausted.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A store command failed.
    #[error("{message}")]
    OperationFailed {
        /// Error message from the store.
        message: String,
    },
}

impl StoreError {
    /// Create a new operation failed error.
    pub fn operation_failed(message: impl Into<String>) -> Self {
        Self::OperationFailed {
            message: message.into(),
        }
    }
}

/// Errors from parsing usage metadata headers.
///
/// A missing header must not be interpreted as "zero usage"; the reporting
/// transform fails instead of silently defaulting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    /// Required header is absent.
    #[error("header {0} not exist")]
    MissingHeader(&'static str),

    /// Header value is not an unsigned integer.
    #[error("header {name} has non-numeric value {value:?}")]
    NotNumeric {
        /// Header name.
        name: &'static str,
        /// The offending value.
        value: String,
    },
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid quota configuration.
    #[error("Invalid quota: {0}")]
    InvalidQuota(String),

    /// Invalid store configuration.
    #[error("Invalid store configuration: {0}")]
    InvalidStore(String),
}
