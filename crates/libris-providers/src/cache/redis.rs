//! Redis distributed cache provider
//!
//! Distributed cache implementation using Redis as the backend. Session
//! markers must live here when more than one server instance validates
//! tokens.
//!
//! ## Features
//!
//! - `SETEX` for per-entry TTL
//! - One lazily established [`ConnectionManager`] shared by all callers,
//!   reconnecting on failure
//! - Per-command timeout so a stalled server turns into an error quickly
//!
//! ## Example
//!
//! ```ignore
//! use libris_providers::cache::RedisCacheProvider;
//!
//! let provider = RedisCacheProvider::new("redis://localhost:6379")?;
//! ```

use crate::constants::REDIS_COMMAND_TIMEOUT_MS;
use async_trait::async_trait;
use libris_domain::error::{Error, Result};
use libris_domain::ports::providers::cache::{CacheEntryConfig, CacheProvider, CacheStats};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::OnceCell;

/// Redis cache provider
#[derive(Clone)]
pub struct RedisCacheProvider {
    client: Client,
    connection: Arc<OnceCell<ConnectionManager>>,
    command_timeout: Duration,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl RedisCacheProvider {
    /// Create a new Redis cache provider with connection string
    ///
    /// No connection is made until the first command.
    ///
    /// # Arguments
    ///
    /// * `connection_string` - Redis connection URL (e.g., "redis://localhost:6379")
    pub fn new(connection_string: &str) -> Result<Self> {
        let client = Client::open(connection_string)
            .map_err(|e| Error::cache_with_source("Failed to create Redis client", e))?;

        Ok(Self {
            client,
            connection: Arc::new(OnceCell::new()),
            command_timeout: Duration::from_millis(REDIS_COMMAND_TIMEOUT_MS),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Override the per-command timeout
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Get the shared connection, establishing it on first use
    async fn connection(&self) -> Result<ConnectionManager> {
        let client = self.client.clone();
        let manager = self
            .bounded("CONNECT", async move {
                self.connection
                    .get_or_try_init(|| ConnectionManager::new(client))
                    .await
                    .cloned()
            })
            .await?;
        Ok(manager)
    }

    /// Run one Redis round trip under the command timeout
    async fn bounded<T, F>(&self, command: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.command_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(Error::cache_with_source(
                format!("Redis {command} failed"),
                e,
            )),
            Err(_) => Err(Error::cache(format!(
                "Redis {command} timed out after {}ms",
                self.command_timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = self.bounded("GET", conn.get(key)).await?;

        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        Ok(value)
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        let mut conn = self.connection().await?;

        // SETEX rejects a zero TTL; round sub-second TTLs up
        let ttl_seconds = config.ttl.as_secs().max(1);
        self.bounded::<(), _>("SETEX", conn.set_ex(key, value, ttl_seconds))
            .await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let deleted: i64 = self.bounded("DEL", conn.del(key)).await?;
        Ok(deleted > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let exists: i64 = self.bounded("EXISTS", conn.exists(key)).await?;
        Ok(exists > 0)
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        self.bounded::<(), _>("FLUSHDB", redis::cmd("FLUSHDB").query_async(&mut conn))
            .await
    }

    async fn stats(&self) -> Result<CacheStats> {
        let mut conn = self.connection().await?;
        let dbsize: u64 = self
            .bounded("DBSIZE", redis::cmd("DBSIZE").query_async(&mut conn))
            .await?;

        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: dbsize,
        })
    }

    fn provider_name(&self) -> &str {
        "redis"
    }
}

impl std::fmt::Debug for RedisCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheProvider")
            .field("connected", &self.connection.initialized())
            .field("command_timeout", &self.command_timeout)
            .finish_non_exhaustive()
    }
}
