//! Cache configuration types

use crate::constants::{
    CACHE_DEFAULT_ENTITY_TTL_SECS, CACHE_DEFAULT_MAX_ENTRIES, CACHE_DEFAULT_OPERATION_TIMEOUT_MS,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cache providers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheProviderKind {
    /// In-memory cache (Moka)
    Moka,
    /// Distributed cache (Redis)
    Redis,
    /// No entity caching
    Null,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache provider
    pub provider: CacheProviderKind,

    /// Entity snapshot TTL in seconds
    pub entity_ttl_secs: u64,

    /// Upper bound for one cache operation, in milliseconds
    pub operation_timeout_ms: u64,

    /// Capacity of the in-process cache
    pub max_entries: u64,

    /// Redis URL (for Redis provider)
    #[serde(default)]
    pub redis_url: Option<String>,
}

impl CacheConfig {
    /// Entity TTL as a duration
    pub fn entity_ttl(&self) -> Duration {
        Duration::from_secs(self.entity_ttl_secs)
    }

    /// Operation timeout as a duration
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider: CacheProviderKind::Moka,
            entity_ttl_secs: CACHE_DEFAULT_ENTITY_TTL_SECS,
            operation_timeout_ms: CACHE_DEFAULT_OPERATION_TIMEOUT_MS,
            max_entries: CACHE_DEFAULT_MAX_ENTRIES,
            redis_url: None,
        }
    }
}
