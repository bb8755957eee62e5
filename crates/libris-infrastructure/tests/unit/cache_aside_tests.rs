//! Cache-aside reads, invalidation after commit and fail-open behavior

use crate::support::{Fixture, UnreachableCache, test_config};
use libris_domain::entities::{Gender, MemberPatch, NewMember};
use libris_domain::error::Result;
use libris_domain::ports::providers::{CacheEntryConfig, CacheProvider};
use libris_domain::value_objects::RoleName;
use libris_infrastructure::CacheProviders;
use libris_infrastructure::cache::CacheAside;
use libris_infrastructure::services::UserChanges;
use libris_providers::cache::MokaCacheProvider;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

fn new_member(name: &str, phone: &str) -> NewMember {
    NewMember {
        name: name.to_string(),
        gender: Gender::Female,
        class: "XII IPA 1".to_string(),
        phone: phone.to_string(),
        photo: None,
    }
}

#[tokio::test]
async fn test_cold_read_queries_once_then_hits_cache() {
    let fx = Fixture::new();
    let sari = fx.identity("Sari", &[RoleName::Staff]).await;

    let before = fx.directory.query_count();
    let first = fx.ctx.users().get(&sari.id).await.unwrap();
    assert_eq!(fx.directory.query_count(), before + 1);
    assert!(
        fx.entity_cache
            .exists(&format!("user:{}", sari.id))
            .await
            .unwrap()
    );

    let second = fx.ctx.users().get(&sari.id).await.unwrap();
    assert_eq!(fx.directory.query_count(), before + 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_read_after_update_is_fresh() {
    let fx = Fixture::new();
    let member = fx
        .ctx
        .members()
        .create(new_member("Dewi", "0811"))
        .await
        .unwrap();

    // Populate the cache, then mutate through the service
    fx.ctx.members().get(&member.id).await.unwrap();
    fx.ctx
        .members()
        .update(
            &member.id,
            MemberPatch {
                class: Some("XII IPS 2".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let after = fx.ctx.members().get(&member.id).await.unwrap();
    assert_eq!(after.class, "XII IPS 2");
}

#[tokio::test]
async fn test_delete_evicts_snapshot() {
    let fx = Fixture::new();
    let member = fx
        .ctx
        .members()
        .create(new_member("Dewi", "0811"))
        .await
        .unwrap();
    fx.ctx.members().get(&member.id).await.unwrap();

    fx.ctx.members().delete(&member.id).await.unwrap();

    assert!(fx.ctx.members().get(&member.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_role_rename_refreshes_holder_snapshots() {
    let fx = Fixture::new();
    let admin = fx.identity("Ayu", &[RoleName::Admin]).await;
    let sari = fx.identity("Sari", &[RoleName::Staff]).await;
    let staff_role = fx.role(RoleName::Staff).await;

    assert!(fx.ctx.users().get(&sari.id).await.unwrap().has_role(RoleName::Staff));

    fx.ctx
        .roles()
        .rename(&admin.id, &staff_role.id, RoleName::User)
        .await
        .unwrap();

    let refreshed = fx.ctx.users().get(&sari.id).await.unwrap();
    assert!(refreshed.has_role(RoleName::User));
    assert!(!refreshed.has_role(RoleName::Staff));
}

#[tokio::test]
async fn test_undecodable_entry_falls_back_to_store() {
    let fx = Fixture::new();
    let member = fx
        .ctx
        .members()
        .create(new_member("Dewi", "0811"))
        .await
        .unwrap();
    let key = format!("member:{}", member.id);
    fx.entity_cache
        .set_json(&key, "{not json", CacheEntryConfig::new())
        .await
        .unwrap();

    let loaded = fx.ctx.members().get(&member.id).await.unwrap();
    assert_eq!(loaded.name, "Dewi");

    let rewritten = fx.entity_cache.get_json(&key).await.unwrap().unwrap();
    assert!(rewritten.contains("Dewi"));
}

#[tokio::test]
async fn test_unreachable_cache_keeps_crud_working() {
    let fx = Fixture::with_caches(CacheProviders {
        entities: Arc::new(UnreachableCache),
        sessions: Arc::new(MokaCacheProvider::new()),
    });
    let admin = fx.identity("Ayu", &[RoleName::Admin]).await;

    let member = fx
        .ctx
        .members()
        .create(new_member("Dewi", "0811"))
        .await
        .unwrap();
    assert_eq!(member.code, "ID001");

    let before = fx.catalog.query_count();
    fx.ctx.members().get(&member.id).await.unwrap();
    fx.ctx.members().get(&member.id).await.unwrap();
    assert_eq!(fx.catalog.query_count(), before + 2);

    let updated = fx
        .ctx
        .members()
        .update(
            &member.id,
            MemberPatch {
                phone: Some("0822".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.phone, "0822");
    fx.ctx.members().delete(&member.id).await.unwrap();

    // Auth still works because markers live in a separate store
    let token = fx.login("Ayu").await;
    let principal = fx
        .ctx
        .validator()
        .validate(Some(&crate::support::bearer(&token)))
        .await
        .unwrap();
    assert_eq!(principal.identity_id(), admin.id);

    fx.ctx
        .users()
        .update(
            &admin.id,
            &admin.id,
            UserChanges {
                name: Some("Ayu P.".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(fx.ctx.users().get(&admin.id).await.unwrap().name, "Ayu P.");
}

#[tokio::test]
async fn test_missing_entity_is_not_cached() {
    let provider = Arc::new(MokaCacheProvider::new());
    let aside = CacheAside::new(provider.clone(), &test_config().cache);
    let loads = AtomicU32::new(0);

    for _ in 0..2 {
        let found: Option<String> = aside
            .read_through("book", "absent", || async {
                loads.fetch_add(1, Ordering::SeqCst);
                Result::Ok(None)
            })
            .await
            .unwrap();
        assert!(found.is_none());
    }

    assert_eq!(loads.load(Ordering::SeqCst), 2);
    assert!(!provider.exists("book:absent").await.unwrap());
}

#[tokio::test]
async fn test_loader_error_propagates() {
    let aside = CacheAside::new(Arc::new(MokaCacheProvider::new()), &test_config().cache);
    let err = aside
        .read_through::<String, _, _>("book", "b1", || async {
            Err(libris_domain::Error::database("store down"))
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("store down"));
}
