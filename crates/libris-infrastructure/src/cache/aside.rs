//! Cache-aside accessor
//!
//! Reads go to the cache first and fall through to the durable store on a
//! miss, writing the loaded snapshot back with the entity TTL. Writes commit
//! to the durable store first and only then delete the affected keys.
//!
//! Every cache problem (unreachable backend, timeout, undecodable entry) is
//! logged and treated as a miss; it never changes the caller's outcome.
//!
//! ## Staleness bound
//!
//! After a committed mutation a reader can still see the previous snapshot
//! only between the commit and the invalidation, or when a concurrent reader
//! loaded the row before the commit and wrote it back after the
//! invalidation. In the second case the stale entry survives at most one
//! entity TTL, so the bound is `commit -> invalidate latency + entity TTL`.

use super::keys::CacheKey;
use crate::config::CacheConfig;
use libris_domain::error::{Error, Result};
use libris_domain::ports::providers::cache::{CacheEntryConfig, CacheProvider};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Read-through / invalidate-after-commit access to entity snapshots
#[derive(Clone)]
pub struct CacheAside {
    provider: Arc<dyn CacheProvider>,
    ttl: Duration,
    op_timeout: Duration,
}

impl CacheAside {
    /// Create an accessor over `provider` using the configured TTL and timeout
    pub fn new(provider: Arc<dyn CacheProvider>, config: &CacheConfig) -> Self {
        Self {
            provider,
            ttl: config.entity_ttl(),
            op_timeout: config.operation_timeout(),
        }
    }

    /// Override the entity TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Entity TTL
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Underlying cache provider
    pub fn provider(&self) -> Arc<dyn CacheProvider> {
        Arc::clone(&self.provider)
    }

    /// Read `<kind>:<id>`, loading from the durable store on a miss
    ///
    /// `None` from the loader is returned as-is and not cached. Errors from
    /// the loader are propagated; cache errors are not.
    pub async fn read_through<T, F, Fut>(&self, kind: &str, id: &str, load: F) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Option<T>>> + Send,
    {
        let key = CacheKey::entity(kind, id);

        match self.bounded("get", self.provider.get_json(key.as_str())).await {
            Ok(Some(json)) => match serde_json::from_str::<T>(&json) {
                Ok(value) => {
                    debug!(key = %key, "Cache hit");
                    return Ok(Some(value));
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Evicting undecodable cache entry");
                    self.evict(&key).await;
                }
            },
            Ok(None) => debug!(key = %key, "Cache miss"),
            Err(e) => warn!(key = %key, error = %e, "Cache read failed, using durable store"),
        }

        let loaded = load().await?;
        if let Some(value) = &loaded {
            self.store(&key, value).await;
        }
        Ok(loaded)
    }

    /// Delete `<kind>:<id>` after a committed durable mutation
    pub async fn invalidate(&self, kind: &str, id: &str) {
        self.evict(&CacheKey::entity(kind, id)).await;
    }

    /// Delete several keys of the same kind
    pub async fn invalidate_all<'a, I>(&self, kind: &str, ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keys: Vec<CacheKey> = ids
            .into_iter()
            .map(|id| CacheKey::entity(kind, id))
            .collect();
        futures::future::join_all(keys.iter().map(|key| self.evict(key))).await;
    }

    async fn store<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize value for cache");
                return;
            }
        };
        let config = CacheEntryConfig::new().with_ttl(self.ttl);
        if let Err(e) = self
            .bounded("set", self.provider.set_json(key.as_str(), &json, config))
            .await
        {
            warn!(key = %key, error = %e, "Cache write failed");
        }
    }

    async fn evict(&self, key: &CacheKey) {
        if let Err(e) = self.bounded("delete", self.provider.delete(key.as_str())).await {
            warn!(key = %key, error = %e, "Cache invalidation failed");
        }
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.op_timeout, fut)
            .await
            .unwrap_or_else(|_| {
                Err(Error::cache(format!(
                    "cache {op} timed out after {}ms",
                    self.op_timeout.as_millis()
                )))
            })
    }
}

impl fmt::Debug for CacheAside {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheAside")
            .field("provider", &self.provider.provider_name())
            .field("ttl", &self.ttl)
            .field("op_timeout", &self.op_timeout)
            .finish()
    }
}
