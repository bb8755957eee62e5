//! Redis cache provider tests
//!
//! Require a disposable Redis:
//! `LIBRIS_TEST_REDIS_URL=redis://127.0.0.1/15 cargo test -p libris-providers --features full -- --ignored`

use libris_providers::CacheProvider;
use libris_providers::cache::{CacheEntryConfig, RedisCacheProvider};

fn provider() -> RedisCacheProvider {
    let url = std::env::var("LIBRIS_TEST_REDIS_URL")
        .expect("LIBRIS_TEST_REDIS_URL must be set for Redis tests");
    RedisCacheProvider::new(&url).unwrap()
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn test_marker_lifecycle() {
    let cache = provider();
    let key = format!("session:{}", uuid::Uuid::new_v4());

    cache
        .set_json(&key, "1", CacheEntryConfig::new().with_ttl_secs(30))
        .await
        .unwrap();
    assert!(cache.exists(&key).await.unwrap());
    assert!(cache.delete(&key).await.unwrap());
    assert!(!cache.exists(&key).await.unwrap());
}

#[tokio::test]
async fn test_unreachable_server_reports_cache_error() {
    let cache = RedisCacheProvider::new("redis://127.0.0.1:1/").unwrap();
    let err = cache.get_json("user:1").await.unwrap_err();
    assert!(err.to_string().to_lowercase().contains("cache"));
}
