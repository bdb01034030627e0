//! Redis counter store for distributed rate limiting.
//!
//! `INCR` is atomic server-side, which is exactly the guarantee the limiter
//! needs: every instance of a service increments the same shared counter and
//! no two concurrent requests can observe the same post-increment value.
//! Uses connection pooling for high performance.

use std::time::Duration;

use deadpool_redis::{Config, Connection, Pool, Runtime, redis::{AsyncCommands, cmd}};

use crate::error::{Result, StoreError};
use crate::store::CounterStore;

/// Redis store configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
    /// Connection pool size
    pub pool_size: usize,
    /// Key prefix for counter keys. Empty by default so the wire keys are
    /// exactly `"<identity>-<windowStart>"`.
    pub key_prefix: String,
    /// Connection timeout
    pub connection_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            pool_size: 10,
            key_prefix: String::new(),
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisConfig {
    /// Create a new Redis configuration.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Set the pool size.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }
}

/// Redis counter store.
///
/// # Example
///
/// ```ignore
/// use quotagate::store::{RedisStore, RedisConfig};
///
/// let config = RedisConfig::new("redis://localhost:6379")
///     .with_prefix("myapp:")
///     .with_pool_size(20);
///
/// let store = RedisStore::new(config).await?;
/// ```
pub struct RedisStore {
    pool: Pool,
    key_prefix: String,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

impl RedisStore {
    /// Create a new Redis store from configuration.
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let cfg = Config::from_url(&config.url);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        // Test connection
        let mut conn = pool
            .get()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;
        let _: () = cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            pool,
            key_prefix: config.key_prefix,
        })
    }

    /// Create a new Redis store from a URL.
    pub async fn from_url(url: impl Into<String>) -> Result<Self> {
        Self::new(RedisConfig::new(url)).await
    }

    /// Get the full key with prefix.
    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> Result<Connection> {
        self.pool
            .get()
            .await
            .map_err(|_| StoreError::PoolExhausted.into())
    }
}

impl CounterStore for RedisStore {
    async fn increment(&self, key: &str) -> Result<u64> {
        let mut conn = self.get_conn().await?;
        let full_key = self.full_key(key);

        let count: u64 = conn
            .incr(&full_key, 1u64)
            .await
            .map_err(|e| StoreError::operation_failed(e.to_string()))?;

        Ok(count)
    }

    async fn expire_at(&self, key: &str, deadline_unix: u64) -> Result<()> {
        let mut conn = self.get_conn().await?;
        let full_key = self.full_key(key);

        let _: () = conn
            .expire_at(&full_key, deadline_unix as i64)
            .await
            .map_err(|e| StoreError::operation_failed(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_config() {
        let config = RedisConfig::new("redis://localhost:6380")
            .with_prefix("test:")
            .with_pool_size(5);

        assert_eq!(config.url, "redis://localhost:6380");
        assert_eq!(config.key_prefix, "test:");
        assert_eq!(config.pool_size, 5);
    }

    #[test]
    fn test_redis_config_default_prefix_is_empty() {
        let config = RedisConfig::new("redis://localhost:6379");
        assert_eq!(config.key_prefix, "");
    }
}
