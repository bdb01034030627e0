//! Epoch-anchored window math and window keys.
//!
//! A window is a half-open interval `[start, start + D)` of fixed length `D`,
//! anchored at the Unix epoch: `window_start(t) = floor(t / D) * D`. Given
//! synchronized clocks, no two processes disagree on the boundary for the
//! same instant, so every instance of a service addresses the same counter.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Convert a `SystemTime` to whole Unix seconds.
pub fn unix_seconds(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}

/// Start of the fixed window containing `now_unix`, in Unix seconds.
pub fn window_start(now_unix: u64, window_secs: u64) -> u64 {
    (now_unix / window_secs) * window_secs
}

/// Composite identity of one counter: a client plus the window it falls in.
///
/// Renders as `"<identity>-<windowStart_unix_seconds>"`. The timestamp is the
/// digit run after the final `-`, so identities that themselves contain `-`
/// (IPv6 text, API keys) cannot collide with a different identity/window
/// pair. The rendered key is opaque to the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowKey {
    identity: String,
    start: u64,
}

impl WindowKey {
    /// Create a key for `identity` in the window starting at `start`.
    pub fn new(identity: impl Into<String>, start: u64) -> Self {
        Self {
            identity: identity.into(),
            start,
        }
    }

    /// The client identity component.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Window start, Unix seconds.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Absolute expiry deadline for this window's counter: `start + D`.
    pub fn deadline(&self, window_secs: u64) -> u64 {
        self.start + window_secs
    }
}

impl fmt::Display for WindowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.identity, self.start)
    }
}
