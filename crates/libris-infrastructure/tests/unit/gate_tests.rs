//! Role gate and admin self-protection

use crate::support::{Fixture, SECRET, SlowIdentities, bearer};
use libris_domain::value_objects::RoleName;
use libris_infrastructure::auth::{
    ADMIN_ONLY, ANY_ROLE, AuthError, RoleGate, STAFF_OR_ADMIN, SigningKeys, TokenIssuer,
    TokenValidator,
};
use libris_infrastructure::cache::SessionStore;
use libris_infrastructure::services::UserChanges;
use libris_providers::cache::MokaCacheProvider;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_staff_denied_on_admin_only() {
    let fx = Fixture::new();
    let staff = fx.identity("Sari", &[RoleName::Staff]).await;

    let err = fx
        .ctx
        .gate()
        .authorize(Some(&staff.id), ADMIN_ONLY)
        .await
        .unwrap_err();
    assert!(err.is_forbidden());
}

#[tokio::test]
async fn test_admin_staff_allowed_on_staff_route() {
    let fx = Fixture::new();
    let both = fx.identity("Ayu", &[RoleName::Admin, RoleName::Staff]).await;

    let identity = fx
        .ctx
        .gate()
        .authorize(Some(&both.id), &[RoleName::Staff])
        .await
        .unwrap();
    assert!(identity.is_admin());
    assert!(fx.ctx.gate().authorize(Some(&both.id), STAFF_OR_ADMIN).await.is_ok());
}

#[tokio::test]
async fn test_missing_identity_is_unauthenticated() {
    let fx = Fixture::new();
    assert_eq!(
        fx.ctx.gate().authorize(None, ANY_ROLE).await.unwrap_err(),
        AuthError::Unauthenticated
    );
    assert_eq!(
        fx.ctx
            .gate()
            .authorize(Some("ghost"), ANY_ROLE)
            .await
            .unwrap_err(),
        AuthError::IdentityNotFound
    );
}

#[tokio::test(start_paused = true)]
async fn test_gate_only_gets_what_validation_left_of_the_deadline() {
    let fx = Fixture::new();
    let staff = fx.identity("Sari", &[RoleName::Staff]).await;

    let keys = SigningKeys::from_secret(SECRET);
    let sessions = SessionStore::new(Arc::new(MokaCacheProvider::new()), Duration::from_millis(250));
    let token = TokenIssuer::new(
        fx.directory.clone(),
        sessions.clone(),
        keys.clone(),
        Duration::from_secs(3_600),
    )
    .issue(&staff.id)
    .await
    .unwrap()
    .token;

    // Each lookup takes 60ms of a 100ms request deadline
    let slow = Arc::new(SlowIdentities {
        inner: fx.directory.clone(),
        delay: Duration::from_millis(60),
    });
    let validator = TokenValidator::new(slow.clone(), sessions, keys, Duration::from_millis(100));
    let gate = RoleGate::new(slow, Duration::from_secs(3));

    let principal = validator.validate(Some(&bearer(&token))).await.unwrap();
    assert_eq!(
        gate.authorize_by(Some(&staff.id), STAFF_OR_ADMIN, principal.budget_ends)
            .await
            .unwrap_err(),
        AuthError::DeadlineExceeded
    );

    // A standalone check still gets the gate's own deadline
    assert!(gate.authorize(Some(&staff.id), STAFF_OR_ADMIN).await.is_ok());
}

#[tokio::test]
async fn test_gate_sees_role_removal_immediately() {
    let fx = Fixture::new();
    let admin = fx.identity("Ayu", &[RoleName::Admin]).await;
    let staff = fx.identity("Sari", &[RoleName::Staff]).await;
    let staff_role = fx.role(RoleName::Staff).await;

    // Cached snapshot still says staff until the assignment change invalidates it
    assert!(fx.ctx.gate().authorize(Some(&staff.id), STAFF_OR_ADMIN).await.is_ok());

    fx.ctx
        .roles()
        .remove(&admin.id, &staff.id, &staff_role.id)
        .await
        .unwrap();

    let err = fx
        .ctx
        .gate()
        .authorize(Some(&staff.id), STAFF_OR_ADMIN)
        .await
        .unwrap_err();
    assert!(err.is_forbidden());
}

#[tokio::test]
async fn test_other_identity_cannot_strip_or_delete_admin() {
    let fx = Fixture::new();
    let x = fx.identity("Xena", &[RoleName::Admin]).await;
    let y = fx.identity("Yusuf", &[RoleName::Admin]).await;
    let admin_role = fx.role(RoleName::Admin).await;

    let strip = fx
        .ctx
        .roles()
        .remove(&y.id, &x.id, &admin_role.id)
        .await
        .unwrap_err();
    assert!(matches!(strip, libris_domain::Error::Forbidden { .. }));

    let delete = fx.ctx.users().delete(&y.id, &x.id).await.unwrap_err();
    assert!(matches!(delete, libris_domain::Error::Forbidden { .. }));

    let rename = fx
        .ctx
        .users()
        .update(
            &y.id,
            &x.id,
            UserChanges {
                name: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(rename, libris_domain::Error::Forbidden { .. }));

    assert!(fx.ctx.users().get(&x.id).await.unwrap().is_admin());
}

#[tokio::test]
async fn test_admin_may_modify_itself_and_non_admins() {
    let fx = Fixture::new();
    let x = fx.identity("Xena", &[RoleName::Admin]).await;
    let staff = fx.identity("Sari", &[RoleName::Staff]).await;
    let admin_role = fx.role(RoleName::Admin).await;

    fx.ctx.users().delete(&x.id, &staff.id).await.unwrap();
    fx.ctx
        .roles()
        .remove(&x.id, &x.id, &admin_role.id)
        .await
        .unwrap();
    assert!(!fx.ctx.users().get(&x.id).await.unwrap().is_admin());
}

#[tokio::test]
async fn test_assigned_admin_protected_from_non_admin_scenario() {
    let fx = Fixture::new();
    let root = fx.identity("Root", &[RoleName::Admin]).await;
    let x = fx.identity("Xena", &[]).await;
    let y = fx.identity("Yusuf", &[RoleName::Staff]).await;

    // The admin role already exists for Root, so creating it again conflicts
    assert!(fx.ctx.roles().create(RoleName::Admin).await.unwrap_err().is_conflict());
    let admin_role = fx.role(RoleName::Admin).await;
    fx.ctx.roles().assign(&root.id, &x.id, &admin_role.id).await.unwrap();

    // Y is not an admin, so the gate stops it before any handler runs
    let gate = fx.ctx.gate().authorize(Some(&y.id), ADMIN_ONLY).await.unwrap_err();
    assert!(gate.is_forbidden());

    // Even past the gate, self-protection refuses
    let err = fx.ctx.users().delete(&y.id, &x.id).await.unwrap_err();
    assert!(matches!(err, libris_domain::Error::Forbidden { .. }));
}

#[tokio::test]
async fn test_admin_role_rename_refused_while_held_by_others() {
    let fx = Fixture::new();
    let x = fx.identity("Xena", &[RoleName::Admin]).await;
    let y = fx.identity("Yusuf", &[RoleName::Admin]).await;
    let admin_role = fx.role(RoleName::Admin).await;

    let err = fx
        .ctx
        .roles()
        .rename(&x.id, &admin_role.id, RoleName::User)
        .await
        .unwrap_err();
    assert!(matches!(err, libris_domain::Error::Forbidden { .. }));

    let err = fx.ctx.roles().delete(&y.id, &admin_role.id).await.unwrap_err();
    assert!(matches!(err, libris_domain::Error::Forbidden { .. }));
}
