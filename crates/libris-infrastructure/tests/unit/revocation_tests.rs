//! Logout and logout-everywhere

use crate::support::{Fixture, bearer};
use libris_domain::value_objects::RoleName;
use libris_infrastructure::auth::AuthError;
use libris_infrastructure::services::UserChanges;

#[tokio::test]
async fn test_login_request_logout_scenario() {
    let fx = Fixture::new();
    fx.identity("Sari", &[RoleName::Staff]).await;
    let token = fx.login("Sari").await;
    let header = bearer(&token);

    assert!(fx.ctx.validator().validate(Some(&header)).await.is_ok());

    fx.ctx.revocation().logout(&token).await.unwrap();

    assert_eq!(
        fx.ctx.validator().validate(Some(&header)).await.unwrap_err(),
        AuthError::RevokedOrExpired
    );
    // A second logout of the same token is harmless
    assert!(fx.ctx.revocation().logout(&token).await.is_ok());
}

#[tokio::test]
async fn test_logout_only_affects_that_token() {
    let fx = Fixture::new();
    fx.identity("Sari", &[RoleName::Staff]).await;
    let phone = fx.login("Sari").await;
    let laptop = fx.login("Sari").await;
    assert_ne!(phone, laptop);

    fx.ctx.revocation().logout(&phone).await.unwrap();

    let validator = fx.ctx.validator();
    assert!(validator.validate(Some(&bearer(&phone))).await.is_err());
    assert!(validator.validate(Some(&bearer(&laptop))).await.is_ok());
}

#[tokio::test]
async fn test_revoke_all_invalidates_every_token() {
    let fx = Fixture::new();
    let sari = fx.identity("Sari", &[RoleName::Staff]).await;
    let phone = fx.login("Sari").await;
    let laptop = fx.login("Sari").await;

    let version = fx
        .ctx
        .revocation()
        .revoke_all(&sari.id, Some(&laptop))
        .await
        .unwrap();
    assert_eq!(version, 1);

    let validator = fx.ctx.validator();
    assert_eq!(
        validator.validate(Some(&bearer(&phone))).await.unwrap_err(),
        AuthError::Revoked
    );
    assert_eq!(
        validator.validate(Some(&bearer(&laptop))).await.unwrap_err(),
        AuthError::RevokedOrExpired
    );

    // Fresh logins carry the new version
    let fresh = fx.login("Sari").await;
    let principal = validator.validate(Some(&bearer(&fresh))).await.unwrap();
    assert_eq!(principal.claims.token_version, 1);
}

#[tokio::test]
async fn test_password_change_bumps_version() {
    let fx = Fixture::new();
    let sari = fx.identity("Sari", &[RoleName::Staff]).await;
    let token = fx.login("Sari").await;

    let updated = fx
        .ctx
        .users()
        .update(
            &sari.id,
            &sari.id,
            UserChanges {
                password: Some("new-password".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.token_version, 1);

    assert_eq!(
        fx.ctx.validator().validate(Some(&bearer(&token))).await.unwrap_err(),
        AuthError::Revoked
    );
    assert!(
        fx.ctx
            .authenticator()
            .login("sari@libris.test", "new-password")
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_profile_change_keeps_sessions() {
    let fx = Fixture::new();
    let sari = fx.identity("Sari", &[RoleName::Staff]).await;
    let token = fx.login("Sari").await;

    fx.ctx
        .users()
        .update(
            &sari.id,
            &sari.id,
            UserChanges {
                name: Some("Sari W.".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let principal = fx.ctx.validator().validate(Some(&bearer(&token))).await.unwrap();
    assert_eq!(principal.identity.name, "Sari W.");
    assert_eq!(principal.identity.token_version, 0);
}
