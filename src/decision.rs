//! Decision types for rate limiting results.
//!
//! A recorded request produces a `Decision`: allowed or denied, plus the
//! usage state behind it. The count returned by the store already includes
//! the request being decided, so a request observing `count > limit` is
//! denied *after* having consumed a slot in the window's counter. This is
//! intentional: the counter reflects total attempts, not only admitted ones,
//! so a client cannot reset its quota by being rejected.

use serde::{Deserialize, Serialize};

use crate::headers::names;

/// The result of a rate limit check.
#[derive(Debug, Clone)]
pub struct Decision {
    /// Whether the request is allowed.
    allowed: bool,
    /// Usage information.
    info: UsageInfo,
}

impl Decision {
    /// Apply the admit/reject policy to a post-increment count.
    ///
    /// `count > limit` denies; otherwise the request is allowed with
    /// `remaining = limit - count` (zero on the exact boundary request,
    /// never negative under the allowed branch).
    pub fn evaluate(count: u64, limit: u64) -> Self {
        if count > limit {
            Self::denied(UsageInfo {
                limit,
                remaining: 0,
                count,
            })
        } else {
            Self::allowed(UsageInfo {
                limit,
                remaining: limit - count,
                count,
            })
        }
    }

    /// Create a new "allowed" decision.
    pub fn allowed(info: UsageInfo) -> Self {
        Self {
            allowed: true,
            info,
        }
    }

    /// Create a new "denied" decision.
    pub fn denied(info: UsageInfo) -> Self {
        Self {
            allowed: false,
            info,
        }
    }

    /// Check if the request is allowed.
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Check if the request is denied.
    pub fn is_denied(&self) -> bool {
        !self.allowed
    }

    /// Get the usage info.
    pub fn info(&self) -> &UsageInfo {
        &self.info
    }

    /// Consume the decision and return the info.
    pub fn into_info(self) -> UsageInfo {
        self.info
    }
}

/// Usage state of the current window at decision time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInfo {
    /// Maximum requests allowed per window.
    pub limit: u64,
    /// Remaining requests in the current window.
    pub remaining: u64,
    /// Post-increment count, including this request.
    pub count: u64,
}

impl UsageInfo {
    /// Convert to the usage metadata headers propagated downstream.
    ///
    /// Returns (header_name, header_value) pairs for
    /// `x-rate-limit-limit` and `x-rate-limit-remaining`.
    pub fn to_headers(&self) -> Vec<(&'static str, String)> {
        vec![
            (names::RATE_LIMIT_LIMIT, self.limit.to_string()),
            (names::RATE_LIMIT_REMAINING, self.remaining.to_string()),
        ]
    }
}
