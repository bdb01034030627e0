//! In-memory counter store with expired-entry sweeping.
//!
//! This backend uses `DashMap` for thread-safe concurrent access; the entry
//! API makes each increment atomic per key. It is suitable for single-process
//! deployments and for tests; distributed deployments should use the Redis
//! backend so all instances share one source of truth.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::Result;
use crate::store::{CounterStore, current_unix_seconds};

/// Sweep interval configuration.
#[derive(Debug, Clone)]
pub enum SweepInterval {
    /// Sweep every N store operations.
    Operations(u64),
    /// Sweep at fixed time intervals from a background task.
    Duration(Duration),
    /// Disable automatic sweeping.
    Manual,
}

impl Default for SweepInterval {
    fn default() -> Self {
        Self::Operations(10000)
    }
}

/// Sweep configuration for expired counters.
///
/// Expired counters are already invisible to reads and increments; sweeping
/// only reclaims their memory.
#[derive(Debug, Clone, Default)]
pub struct SweepConfig {
    /// When to trigger a sweep.
    pub interval: SweepInterval,
}

impl SweepConfig {
    /// Create config with operation-count-based sweeping.
    pub fn on_operations(count: u64) -> Self {
        Self {
            interval: SweepInterval::Operations(count),
        }
    }

    /// Create config with time-based sweeping.
    pub fn on_duration(interval: Duration) -> Self {
        Self {
            interval: SweepInterval::Duration(interval),
        }
    }

    /// Create config with manual sweeping only.
    pub fn manual() -> Self {
        Self {
            interval: SweepInterval::Manual,
        }
    }
}

/// One window counter with its expiry deadline.
#[derive(Debug, Clone)]
struct CounterEntry {
    count: u64,
    /// Absolute deadline, Unix seconds. `None` until `expire_at` is called.
    expires_at: Option<u64>,
}

impl CounterEntry {
    fn is_expired(&self, now: u64) -> bool {
        // Half-open window: the counter is gone at exactly the deadline.
        matches!(self.expires_at, Some(deadline) if deadline <= now)
    }
}

/// In-memory counter store.
///
/// # Example
///
/// ```ignore
/// use quotagate::store::{MemoryStore, SweepConfig};
/// use std::time::Duration;
///
/// // Default sweep (every 10000 operations)
/// let store = MemoryStore::new();
///
/// // Background sweeper task
/// let store = MemoryStore::with_sweep(SweepConfig::on_duration(Duration::from_secs(60)));
///
/// // Manual sweep only
/// let store = MemoryStore::with_sweep(SweepConfig::manual());
/// store.purge_expired();
/// ```
pub struct MemoryStore {
    data: Arc<DashMap<String, CounterEntry>>,
    sweep_config: SweepConfig,
    op_count: AtomicU64,
    sweep_lock: Mutex<()>,
    shutdown: Arc<Notify>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.data.len())
            .field("sweep_config", &self.sweep_config)
            .finish()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new memory store with the default sweep configuration.
    pub fn new() -> Self {
        Self::with_sweep(SweepConfig::default())
    }

    /// Create a new memory store with a custom sweep configuration.
    pub fn with_sweep(sweep_config: SweepConfig) -> Self {
        let store = Self {
            data: Arc::new(DashMap::new()),
            sweep_config: sweep_config.clone(),
            op_count: AtomicU64::new(0),
            sweep_lock: Mutex::new(()),
            shutdown: Arc::new(Notify::new()),
        };

        if let SweepInterval::Duration(interval) = sweep_config.interval {
            store.start_sweep_task(interval);
        }

        store
    }

    /// Start the background sweeper task.
    fn start_sweep_task(&self, interval: Duration) {
        let data = self.data.clone();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        sweep_map(&data);
                    }
                    _ = shutdown.notified() => {
                        break;
                    }
                }
            }
        });
    }

    /// Remove every counter whose deadline has passed.
    pub fn purge_expired(&self) {
        sweep_map(&self.data);
    }

    /// Get a counter's current value, honoring expiry.
    pub fn get(&self, key: &str) -> Option<u64> {
        let now = current_unix_seconds();
        self.data
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.count)
    }

    /// Get the number of counters currently stored, including expired
    /// counters not yet swept.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Clear all counters.
    pub fn clear(&self) {
        self.data.clear();
    }

    /// Check if a sweep is due and run it if so.
    fn maybe_sweep(&self) {
        if let SweepInterval::Operations(threshold) = self.sweep_config.interval {
            let count = self.op_count.fetch_add(1, Ordering::Relaxed);
            if count % threshold == 0 && count > 0 {
                // Non-blocking: a concurrent sweep already covers us.
                if let Some(_guard) = self.sweep_lock.try_lock() {
                    sweep_map(&self.data);
                }
            }
        }
    }
}

impl Drop for MemoryStore {
    fn drop(&mut self) {
        self.shutdown.notify_waiters();
    }
}

fn sweep_map(data: &DashMap<String, CounterEntry>) {
    let now = current_unix_seconds();
    data.retain(|_, entry| !entry.is_expired(now));
}

impl CounterStore for MemoryStore {
    async fn increment(&self, key: &str) -> Result<u64> {
        self.maybe_sweep();

        let now = current_unix_seconds();
        let count = self
            .data
            .entry(key.to_string())
            .and_modify(|entry| {
                if entry.is_expired(now) {
                    // Expired counter is treated as absent: restart at 1 and
                    // drop the stale deadline so the caller sets a fresh one.
                    entry.count = 1;
                    entry.expires_at = None;
                } else {
                    entry.count += 1;
                }
            })
            .or_insert(CounterEntry {
                count: 1,
                expires_at: None,
            })
            .count;

        Ok(count)
    }

    async fn expire_at(&self, key: &str, deadline_unix: u64) -> Result<()> {
        if let Some(mut entry) = self.data.get_mut(key) {
            entry.expires_at = Some(deadline_unix);
        }
        Ok(())
    }
}
