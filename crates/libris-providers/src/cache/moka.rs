//! Moka in-memory cache provider
//!
//! Concurrent in-memory cache. Each entry expires after the TTL it was
//! written with, so entity snapshots (minutes) and session markers (hours)
//! can share one cache.
//!
//! ## Example
//!
//! ```ignore
//! use libris_providers::cache::MokaCacheProvider;
//!
//! let entities = MokaCacheProvider::with_capacity(50_000);
//! let sessions = MokaCacheProvider::ttl_only();
//! ```

use crate::constants::CACHE_DEFAULT_MAX_ENTRIES;
use async_trait::async_trait;
use libris_domain::error::Result;
use libris_domain::ports::providers::cache::{CacheEntryConfig, CacheProvider, CacheStats};
use moka::Expiry;
use moka::future::Cache;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Stored value plus the TTL it was written with
#[derive(Clone)]
struct CachedValue {
    json: Arc<str>,
    ttl: Duration,
}

/// Expiry policy reading the TTL off each value
struct PerEntryTtl;

impl Expiry<String, CachedValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Moka-based in-memory cache provider
#[derive(Clone)]
pub struct MokaCacheProvider {
    cache: Cache<String, CachedValue>,
    max_entries: Option<u64>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl Default for MokaCacheProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MokaCacheProvider {
    /// Create a new Moka cache provider with default settings
    pub fn new() -> Self {
        Self::with_capacity(CACHE_DEFAULT_MAX_ENTRIES)
    }

    /// Create a new Moka cache provider holding at most `max_entries`
    ///
    /// Past the bound, moka's admission policy evicts or rejects entries,
    /// so only use it for data that can be reloaded.
    pub fn with_capacity(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();
        Self::from_cache(cache, Some(max_entries))
    }

    /// Unbounded cache; entries leave only when their TTL elapses or they
    /// are deleted
    ///
    /// Session markers must use this: an evicted marker reads as a logout.
    pub fn ttl_only() -> Self {
        let cache = Cache::builder().expire_after(PerEntryTtl).build();
        Self::from_cache(cache, None)
    }

    fn from_cache(cache: Cache<String, CachedValue>, max_entries: Option<u64>) -> Self {
        Self {
            cache,
            max_entries,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Capacity bound, `None` for [`MokaCacheProvider::ttl_only`]
    pub fn max_entries(&self) -> Option<u64> {
        self.max_entries
    }
}

#[async_trait]
impl CacheProvider for MokaCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        if let Some(value) = self.cache.get(key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            Ok(Some(value.json.to_string()))
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            Ok(None)
        }
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        let value = CachedValue {
            json: Arc::from(value),
            ttl: config.ttl,
        };
        self.cache.insert(key.to_string(), value).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.cache.remove(key).await.is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.cache.get(key).await.is_some())
    }

    async fn clear(&self) -> Result<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        // entry_count lags until pending evictions run
        self.cache.run_pending_tasks().await;
        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.entry_count(),
        })
    }

    fn provider_name(&self) -> &str {
        "moka"
    }
}

impl std::fmt::Debug for MokaCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheProvider")
            .field("max_entries", &self.max_entries)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}
