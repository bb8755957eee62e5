//! Token issuance, validation and login

use crate::support::{Fixture, PASSWORD, SECRET, SlowIdentities, UnreachableCache, bearer, email_of};
use chrono::Utc;
use libris_domain::ports::providers::CacheProvider;
use libris_domain::value_objects::RoleName;
use libris_infrastructure::CacheProviders;
use libris_infrastructure::auth::{AuthError, SigningKeys, TokenIssuer, TokenValidator};
use libris_infrastructure::cache::SessionStore;
use libris_providers::cache::MokaCacheProvider;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_login_issues_token_accepted_by_validator() {
    let fx = Fixture::new();
    let staff = fx.identity("Sari", &[RoleName::Staff]).await;

    let issued = fx
        .ctx
        .authenticator()
        .login(&email_of("Sari"), PASSWORD)
        .await
        .unwrap();
    assert_eq!(issued.claims.sub, staff.id);
    assert_eq!(issued.claims.roles, vec!["staff"]);
    assert_eq!(issued.claims.token_version, 0);
    assert_eq!(issued.claims.exp - issued.claims.iat, 14_400);

    let principal = fx
        .ctx
        .validator()
        .validate(Some(&bearer(&issued.token)))
        .await
        .unwrap();
    assert_eq!(principal.identity_id(), staff.id);
    assert_eq!(principal.token, issued.token);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials_uniformly() {
    let fx = Fixture::new();
    fx.identity("Sari", &[]).await;
    let auth = fx.ctx.authenticator();

    let wrong_password = auth.login(&email_of("Sari"), "not-it").await.unwrap_err();
    let unknown_email = auth.login("nobody@libris.test", PASSWORD).await.unwrap_err();

    assert_eq!(wrong_password, AuthError::InvalidCredentials);
    assert_eq!(unknown_email, AuthError::InvalidCredentials);
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn test_missing_or_foreign_scheme_is_rejected() {
    let fx = Fixture::new();
    let validator = fx.ctx.validator();

    assert_eq!(
        validator.validate(None).await.unwrap_err(),
        AuthError::MissingCredential
    );
    assert_eq!(
        validator.validate(Some("Basic abc")).await.unwrap_err(),
        AuthError::MissingCredential
    );
    assert!(matches!(
        validator.validate(Some("Bearer not.a.jwt")).await.unwrap_err(),
        AuthError::Malformed(_)
    ));
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let fx = Fixture::new();
    let sari = fx.identity("Sari", &[RoleName::Staff]).await;

    let foreign = SigningKeys::from_secret("another-secret-another-secret-0000");
    let claims = libris_infrastructure::auth::Claims::for_identity(
        &sari,
        Utc::now().timestamp(),
        3_600,
    );
    let token = foreign.sign(&claims).unwrap();

    assert_eq!(
        fx.ctx.validator().validate(Some(&bearer(&token))).await.unwrap_err(),
        AuthError::InvalidSignature
    );
}

#[tokio::test]
async fn test_version_bump_rejects_token_with_live_marker() {
    let fx = Fixture::new();
    let sari = fx.identity("Sari", &[RoleName::Staff]).await;
    let token = fx.login("Sari").await;
    let header = bearer(&token);

    // Warm the identity snapshot so the bump must invalidate it
    fx.ctx.validator().validate(Some(&header)).await.unwrap();
    fx.ctx
        .identities()
        .increment_token_version(&sari.id)
        .await
        .unwrap();

    assert_eq!(
        fx.ctx.validator().validate(Some(&header)).await.unwrap_err(),
        AuthError::Revoked
    );
}

#[tokio::test]
async fn test_expired_token_is_rejected_with_live_marker() {
    let fx = Fixture::new();
    let sari = fx.identity("Sari", &[]).await;
    let now = Utc::now().timestamp();
    let issued = fx.ctx.issuer().issue_at(&sari.id, now).await.unwrap();
    let header = bearer(&issued.token);

    let validator = fx.ctx.validator();
    assert!(validator.validate_at(Some(&header), issued.claims.exp - 1).await.is_ok());
    assert_eq!(
        validator
            .validate_at(Some(&header), issued.claims.exp)
            .await
            .unwrap_err(),
        AuthError::Expired
    );
}

#[tokio::test]
async fn test_issue_for_unknown_identity_fails() {
    let fx = Fixture::new();
    assert_eq!(
        fx.ctx.issuer().issue("missing").await.unwrap_err(),
        AuthError::IdentityNotFound
    );
}

#[tokio::test]
async fn test_deleted_identity_token_is_rejected() {
    let fx = Fixture::new();
    let sari = fx.identity("Sari", &[]).await;
    let token = fx.login("Sari").await;

    fx.ctx.identities().delete(&sari.id).await.unwrap();

    assert_eq!(
        fx.ctx.validator().validate(Some(&bearer(&token))).await.unwrap_err(),
        AuthError::IdentityNotFound
    );
}

#[tokio::test]
async fn test_validation_past_deadline_fails_closed() {
    let fx = Fixture::new();
    let sari = fx.identity("Sari", &[]).await;

    let keys = SigningKeys::from_secret(SECRET);
    let sessions = SessionStore::new(Arc::new(MokaCacheProvider::new()), Duration::from_millis(250));
    let issuer = TokenIssuer::new(
        fx.directory.clone(),
        sessions.clone(),
        keys.clone(),
        Duration::from_secs(3_600),
    );
    let token = issuer.issue(&sari.id).await.unwrap().token;

    let slow = Arc::new(SlowIdentities {
        inner: fx.directory.clone(),
        delay: Duration::from_millis(500),
    });
    let validator = TokenValidator::new(slow, sessions, keys, Duration::from_millis(50));

    assert_eq!(
        validator.validate(Some(&bearer(&token))).await.unwrap_err(),
        AuthError::DeadlineExceeded
    );
}

#[tokio::test]
async fn test_unreachable_session_store_fails_closed() {
    let entities: Arc<dyn CacheProvider> = Arc::new(MokaCacheProvider::new());
    let fx = Fixture::with_caches(CacheProviders {
        entities,
        sessions: Arc::new(UnreachableCache),
    });
    fx.identity("Sari", &[]).await;

    let err = fx
        .ctx
        .authenticator()
        .login(&email_of("Sari"), PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::SessionStoreUnavailable(_)));
}

#[tokio::test]
async fn test_marker_lookup_failure_rejects_valid_token() {
    let fx = Fixture::new();
    let sari = fx.identity("Sari", &[]).await;
    let keys = SigningKeys::from_secret(SECRET);
    let healthy = SessionStore::new(Arc::new(MokaCacheProvider::new()), Duration::from_millis(250));
    let token = TokenIssuer::new(
        fx.directory.clone(),
        healthy,
        keys.clone(),
        Duration::from_secs(3_600),
    )
    .issue(&sari.id)
    .await
    .unwrap()
    .token;

    let broken = SessionStore::new(Arc::new(UnreachableCache), Duration::from_millis(250));
    let validator = TokenValidator::new(fx.directory.clone(), broken, keys, Duration::from_secs(1));

    assert_eq!(
        validator.validate(Some(&bearer(&token))).await.unwrap_err(),
        AuthError::RevokedOrExpired
    );
}

#[tokio::test]
async fn test_register_assigns_no_role() {
    let fx = Fixture::new();
    let identity = fx
        .ctx
        .authenticator()
        .register("Budi", "budi@libris.test", PASSWORD)
        .await
        .unwrap();
    assert!(identity.roles.is_empty());
    assert_eq!(identity.token_version, 0);

    let duplicate = fx
        .ctx
        .authenticator()
        .register("Budi Two", "budi@libris.test", PASSWORD)
        .await
        .unwrap_err();
    assert!(duplicate.is_conflict());

    // A role-less identity can log in but passes no role gate
    let token = fx.login("Budi").await;
    let principal = fx.ctx.validator().validate(Some(&bearer(&token))).await.unwrap();
    let denied = fx
        .ctx
        .gate()
        .authorize(
            Some(principal.identity_id()),
            libris_infrastructure::auth::ANY_ROLE,
        )
        .await
        .unwrap_err();
    assert!(denied.is_forbidden());
}
