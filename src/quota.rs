//! Quota configuration for rate limiting.
//!
//! A `Quota` defines the per-deployment rate limiting parameters: how many
//! requests are allowed per fixed window, and how long the window is. Both
//! values are validated before a limiter is constructed and never change at
//! runtime.
//!
//! # Examples
//!
//! ```ignore
//! use quotagate::Quota;
//! use std::time::Duration;
//!
//! // 100 requests per minute
//! let quota = Quota::per_minute(100);
//!
//! // Custom: 50 requests per 30 seconds
//! let quota = Quota::new(50, Duration::from_secs(30));
//!
//! // Fallible construction for externally supplied values
//! let quota = Quota::try_new(50, Duration::from_secs(30))?;
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Rate limiting quota configuration.
///
/// Windows are epoch-anchored and a whole number of seconds long, so that
/// every process computes the same window boundary for the same instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    /// Maximum number of requests in one window.
    max_rate: u64,

    /// Window duration, whole seconds.
    window: Duration,
}

impl Quota {
    /// Create a new quota with the given ceiling and window.
    ///
    /// # Panics
    ///
    /// Panics if `max_rate` is 0 or `window` is not a whole, non-zero
    /// number of seconds. Use [`Quota::try_new`] for externally supplied
    /// configuration.
    pub fn new(max_rate: u64, window: Duration) -> Self {
        match Self::try_new(max_rate, window) {
            Ok(quota) => quota,
            Err(e) => panic!("{e}"),
        }
    }

    /// Try to create a new quota, returning an error if invalid.
    pub fn try_new(max_rate: u64, window: Duration) -> Result<Self> {
        if max_rate == 0 {
            return Err(ConfigError::InvalidQuota("max_rate must be greater than 0".into()).into());
        }
        if window.is_zero() {
            return Err(ConfigError::InvalidQuota("window must be non-zero".into()).into());
        }
        if window.subsec_nanos() != 0 {
            return Err(ConfigError::InvalidQuota(
                "window must be a whole number of seconds".into(),
            )
            .into());
        }
        Ok(Self { max_rate, window })
    }

    /// Create a quota allowing `n` requests per second.
    pub fn per_second(n: u64) -> Self {
        Self::new(n, Duration::from_secs(1))
    }

    /// Create a quota allowing `n` requests per minute.
    pub fn per_minute(n: u64) -> Self {
        Self::new(n, Duration::from_secs(60))
    }

    /// Create a quota allowing `n` requests per hour.
    pub fn per_hour(n: u64) -> Self {
        Self::new(n, Duration::from_secs(3600))
    }

    /// Get the maximum requests allowed per window.
    pub fn max_rate(&self) -> u64 {
        self.max_rate
    }

    /// Get the window duration.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Get the window length in whole Unix seconds.
    pub fn window_secs(&self) -> u64 {
        self.window.as_secs()
    }
}

impl Default for Quota {
    fn default() -> Self {
        Self::per_minute(60)
    }
}
