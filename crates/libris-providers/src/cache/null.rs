//! Cache backend that keeps nothing
//!
//! Selected with `provider = "null"`. Entity reads then always reach the
//! durable store, which is how the fallback path gets exercised end to end.

use async_trait::async_trait;
use libris_domain::error::Result;
use libris_domain::ports::providers::cache::{CacheEntryConfig, CacheProvider, CacheStats};
use std::sync::atomic::{AtomicU64, Ordering};

/// Discards writes and counts the misses it serves
#[derive(Debug, Default)]
pub struct NullCacheProvider {
    misses: AtomicU64,
}

impl NullCacheProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheProvider for NullCacheProvider {
    async fn get_json(&self, _key: &str) -> Result<Option<String>> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        Ok(None)
    }

    async fn set_json(&self, _key: &str, _value: &str, _config: CacheEntryConfig) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }

    async fn exists(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        Ok(CacheStats {
            misses: self.misses.load(Ordering::Relaxed),
            ..CacheStats::default()
        })
    }

    fn provider_name(&self) -> &str {
        "null"
    }
}
