//! Cache backends
//!
//! `moka` keeps entries in process and is enough for a single instance.
//! `redis` is required once several instances validate tokens, since every
//! one of them must see the same Active-Session Markers. `null` keeps
//! nothing and sends every entity read to the durable store.

#[cfg(feature = "cache-moka")]
pub mod moka;
pub mod null;
#[cfg(feature = "cache-redis")]
pub mod redis;

#[cfg(feature = "cache-moka")]
pub use moka::MokaCacheProvider;
pub use null::NullCacheProvider;
#[cfg(feature = "cache-redis")]
pub use redis::RedisCacheProvider;

pub use libris_domain::ports::providers::cache::{CacheEntryConfig, CacheStats};
