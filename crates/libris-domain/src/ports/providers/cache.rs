//! Ephemeral key/value store
//!
//! Holds two kinds of entries: entity snapshots written through the
//! cache-aside accessor, and Active-Session Markers written on login.
//! Every write carries its own lifetime.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifetime of an entry written without an explicit one
pub const DEFAULT_ENTRY_TTL: Duration = Duration::from_secs(300);

/// Write options for a single entry
///
/// ```ignore
/// let marker = CacheEntryConfig::new().with_ttl_secs(86_400);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntryConfig {
    pub ttl: Duration,
}

impl CacheEntryConfig {
    pub fn new() -> Self {
        Self {
            ttl: DEFAULT_ENTRY_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_ttl_secs(self, secs: u64) -> Self {
        self.with_ttl(Duration::from_secs(secs))
    }
}

impl Default for CacheEntryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters a backend reports for health checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
}

impl CacheStats {
    /// Share of reads that found an entry; zero before the first read
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            reads => self.hits as f64 / reads as f64,
        }
    }
}

/// Backend for [`CacheEntryConfig`]-scoped JSON entries
///
/// Backends: `moka` (in-process), `redis` (shared across instances) and
/// `null` (stores nothing). A backend that cannot be reached returns
/// `Error::Cache`; callers decide whether that is fatal.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug {
    /// Stored JSON for `key`, `None` when absent or expired
    async fn get_json(&self, key: &str) -> Result<Option<String>>;

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()>;

    /// Remove `key`; `true` when something was removed
    async fn delete(&self, key: &str) -> Result<bool>;

    async fn exists(&self, key: &str) -> Result<bool>;

    async fn clear(&self) -> Result<()>;

    async fn stats(&self) -> Result<CacheStats>;

    fn provider_name(&self) -> &str;
}
