//! Active-Session Marker store
//!
//! A marker keyed by the exact token string exists while that token has not
//! been logged out. Unlike entity snapshots, a cache failure here is returned
//! to the caller: the validator treats it as "revoked".

use super::keys::CacheKey;
use libris_domain::error::{Error, Result};
use libris_domain::ports::providers::cache::{CacheEntryConfig, CacheProvider};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Typed access to session markers
#[derive(Clone)]
pub struct SessionStore {
    provider: Arc<dyn CacheProvider>,
    op_timeout: Duration,
}

impl SessionStore {
    /// Create a store over `provider`, bounding each operation by `op_timeout`
    pub fn new(provider: Arc<dyn CacheProvider>, op_timeout: Duration) -> Self {
        Self {
            provider,
            op_timeout,
        }
    }

    /// Register the marker for `token`, holding `holder` (the display name)
    pub async fn put(&self, token: &str, holder: &str, ttl: Duration) -> Result<()> {
        let key = CacheKey::session(token);
        let value = serde_json::to_string(holder)?;
        let config = CacheEntryConfig::new().with_ttl(ttl);
        self.bounded("set", self.provider.set_json(key.as_str(), &value, config))
            .await
    }

    /// Whether the marker for `token` is present
    pub async fn contains(&self, token: &str) -> Result<bool> {
        let key = CacheKey::session(token);
        self.bounded("exists", self.provider.exists(key.as_str()))
            .await
    }

    /// Delete the marker for `token`; `false` if it was already gone
    pub async fn remove(&self, token: &str) -> Result<bool> {
        let key = CacheKey::session(token);
        self.bounded("delete", self.provider.delete(key.as_str()))
            .await
    }

    /// Name of the backing provider
    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.op_timeout, fut)
            .await
            .unwrap_or_else(|_| {
                Err(Error::cache(format!(
                    "session marker {op} timed out after {}ms",
                    self.op_timeout.as_millis()
                )))
            })
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("provider", &self.provider.provider_name())
            .field("op_timeout", &self.op_timeout)
            .finish()
    }
}
