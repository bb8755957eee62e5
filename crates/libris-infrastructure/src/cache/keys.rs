//! Deterministic cache keys

use crate::constants::CACHE_KEY_SEPARATOR;
use libris_domain::constants::SESSION_MARKER_PREFIX;
use std::fmt;

/// A `<kind>:<id>` cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key of an entity snapshot
    pub fn entity(kind: &str, id: &str) -> Self {
        Self(format!("{kind}{CACHE_KEY_SEPARATOR}{id}"))
    }

    /// Key of the Active-Session Marker for an exact token string
    pub fn session(token: &str) -> Self {
        Self::entity(SESSION_MARKER_PREFIX, token)
    }

    /// Key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
