//! Usage metadata headers.
//!
//! Admitted requests carry two headers downstream so that any handler can
//! report current usage back to the client: the configured ceiling and the
//! remaining allowance. This module owns the canonical names and the
//! header-to-integer transform used by reporting handlers.

use crate::error::UsageError;
use crate::identity::HasHeaders;

/// Canonical usage metadata header names, lowercase.
pub mod names {
    /// Maximum requests allowed per window.
    pub const RATE_LIMIT_LIMIT: &str = "x-rate-limit-limit";

    /// Remaining requests in the current window.
    pub const RATE_LIMIT_REMAINING: &str = "x-rate-limit-remaining";
}

/// Compute the used rate from a request's usage metadata headers.
///
/// Parses both headers and returns `limit - remaining`. A missing header or
/// a non-numeric value is an error, never a silent zero: "no metadata" must
/// not be reported as "no usage".
pub fn used_rate<R: HasHeaders>(request: &R) -> Result<u64, UsageError> {
    let limit = parse_header(request, names::RATE_LIMIT_LIMIT)?;
    let remaining = parse_header(request, names::RATE_LIMIT_REMAINING)?;
    Ok(limit.saturating_sub(remaining))
}

fn parse_header<R: HasHeaders>(request: &R, name: &'static str) -> Result<u64, UsageError> {
    let value = request.header(name).ok_or(UsageError::MissingHeader(name))?;
    value.trim().parse().map_err(|_| UsageError::NotNumeric {
        name,
        value: value.to_string(),
    })
}
