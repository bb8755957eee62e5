//! Login, logout and the bearer guard over HTTP

use crate::support::{PASSWORD, TestServer, email_of, test_config};
use libris_domain::value_objects::RoleName;
use libris_infrastructure::config::RateLimitConfig;
use rocket::http::{Method, Status};
use serde_json::json;

#[rocket::async_test]
async fn test_login_profile_logout_scenario() {
    let server = TestServer::new().await;
    server.identity("Sari", &[RoleName::Staff]).await;

    let token = server.login("Sari").await;
    let profile = server.get("/api/profile", Some(&token)).await;
    assert_eq!(profile.status, Status::Ok);
    assert_eq!(profile.body["data"]["email"], "sari@libris.test");
    assert_eq!(profile.body["data"]["roles"], json!(["staff"]));

    let logout = server
        .send(Method::Post, "/api/logout", Some(&token), None)
        .await;
    assert_eq!(logout.status, Status::Ok);

    let after = server.get("/api/profile", Some(&token)).await;
    assert_eq!(after.status, Status::Unauthorized);
}

#[rocket::async_test]
async fn test_every_auth_failure_has_the_same_body() {
    let server = TestServer::new().await;
    server.identity("Sari", &[RoleName::Staff]).await;
    let token = server.login("Sari").await;
    server
        .send(Method::Post, "/api/logout", Some(&token), None)
        .await;

    let missing = server.get("/api/profile", None).await;
    let garbage = server.get("/api/profile", Some("not.a.jwt")).await;
    let revoked = server.get("/api/profile", Some(&token)).await;

    for reply in [&missing, &garbage, &revoked] {
        assert_eq!(reply.status, Status::Unauthorized);
    }
    assert_eq!(missing.body, garbage.body);
    assert_eq!(garbage.body, revoked.body);
    assert_eq!(
        missing.body,
        json!({ "code": 401, "status": "Unauthorized", "message": "unauthorized" })
    );
}

#[rocket::async_test]
async fn test_wrong_password_and_unknown_email_look_alike() {
    let server = TestServer::new().await;
    server.identity("Sari", &[RoleName::Staff]).await;

    let wrong = server
        .post(
            "/api/login",
            None,
            json!({ "email": email_of("Sari"), "password": "nope" }),
        )
        .await;
    let unknown = server
        .post(
            "/api/login",
            None,
            json!({ "email": "ghost@libris.test", "password": PASSWORD }),
        )
        .await;

    assert_eq!(wrong.status, Status::Unauthorized);
    assert_eq!(wrong.body, unknown.body);
}

#[rocket::async_test]
async fn test_logout_all_revokes_other_devices() {
    let server = TestServer::new().await;
    server.identity("Sari", &[RoleName::Staff]).await;
    let phone = server.login("Sari").await;
    let laptop = server.login("Sari").await;

    let reply = server
        .send(Method::Post, "/api/logout-all", Some(&laptop), None)
        .await;
    assert_eq!(reply.status, Status::Ok);
    assert_eq!(reply.body["data"]["token_version"], 1);

    assert_eq!(
        server.get("/api/profile", Some(&phone)).await.status,
        Status::Unauthorized
    );
    assert_eq!(
        server.get("/api/profile", Some(&laptop)).await.status,
        Status::Unauthorized
    );

    let fresh = server.login("Sari").await;
    assert_eq!(
        server.get("/api/profile", Some(&fresh)).await.status,
        Status::Ok
    );
}

#[rocket::async_test]
async fn test_register_validates_and_rejects_duplicates() {
    let server = TestServer::new().await;

    let invalid = server
        .post(
            "/api/register",
            None,
            json!({ "name": "Al", "email": "nope", "password": "123" }),
        )
        .await;
    assert_eq!(invalid.status, Status::BadRequest);

    let body = json!({ "name": "Budi", "email": "budi@libris.test", "password": "budi-pass" });
    let created = server.post("/api/register", None, body.clone()).await;
    assert_eq!(created.status, Status::Created);
    assert_eq!(created.body["data"]["roles"], json!([]));

    let duplicate = server.post("/api/register", None, body).await;
    assert_eq!(duplicate.status, Status::Conflict);
}

#[rocket::async_test]
async fn test_repeated_failed_logins_lock_the_client_out() {
    let mut config = test_config();
    config.rate_limit = RateLimitConfig {
        max_failed_attempts: 2,
        ..Default::default()
    };
    let server = TestServer::with_config(config).await;
    server.identity("Sari", &[RoleName::Staff]).await;
    let bad = json!({ "email": email_of("Sari"), "password": "nope" });

    assert_eq!(
        server.post("/api/login", None, bad.clone()).await.status,
        Status::Unauthorized
    );
    let locked = server.post("/api/login", None, bad).await;
    assert_eq!(locked.status, Status::TooManyRequests);
    assert_eq!(locked.retry_after.as_deref(), Some("300"));

    // Even the right password waits out the lockout
    let right = json!({ "email": email_of("Sari"), "password": PASSWORD });
    assert_eq!(
        server.post("/api/login", None, right).await.status,
        Status::TooManyRequests
    );
}

#[rocket::async_test]
async fn test_request_quota_returns_retry_after() {
    let mut config = test_config();
    config.rate_limit = RateLimitConfig {
        max_requests: 2,
        ..Default::default()
    };
    let server = TestServer::with_config(config).await;
    server.identity("Sari", &[RoleName::Staff]).await;
    let token = server.login("Sari").await;

    assert_eq!(
        server.get("/api/profile", Some(&token)).await.status,
        Status::Ok
    );
    let limited = server.get("/api/profile", Some(&token)).await;
    assert_eq!(limited.status, Status::TooManyRequests);
    assert!(limited.retry_after.is_some());
    assert_eq!(limited.body["code"], 429);
}
