//! Admin routes: role gate and admin self-protection

use crate::support::TestServer;
use libris_domain::value_objects::RoleName;
use rocket::http::Status;
use serde_json::json;

#[rocket::async_test]
async fn test_staff_is_denied_admin_routes() {
    let server = TestServer::new().await;
    server.identity("Ayu", &[RoleName::Admin]).await;
    server.identity("Sari", &[RoleName::Staff]).await;

    let staff = server.login("Sari").await;
    let denied = server.get("/api/users", Some(&staff)).await;
    assert_eq!(denied.status, Status::Forbidden);
    assert_eq!(
        denied.body,
        json!({ "code": 403, "status": "Forbidden", "message": "forbidden" })
    );

    let admin = server.login("Ayu").await;
    let listed = server.get("/api/users", Some(&admin)).await;
    assert_eq!(listed.status, Status::Ok);
    assert_eq!(listed.body["data"].as_array().unwrap().len(), 2);
}

#[rocket::async_test]
async fn test_admin_cannot_delete_another_admin() {
    let server = TestServer::new().await;
    server.identity("Ayu", &[RoleName::Admin]).await;
    let bima = server.identity("Bima", &[RoleName::Admin]).await;
    let ayu = server.login("Ayu").await;

    let reply = server
        .delete(&format!("/api/users/{}", bima.id), Some(&ayu))
        .await;
    assert_eq!(reply.status, Status::Forbidden);
    assert!(server.stored(&bima.id).await.is_some());

    let strip = server
        .delete(
            &format!(
                "/api/users/{}/roles/{}",
                bima.id,
                server.role(RoleName::Admin).await.id
            ),
            Some(&ayu),
        )
        .await;
    assert_eq!(strip.status, Status::Forbidden);
}

#[rocket::async_test]
async fn test_assigned_role_takes_effect_on_next_request() {
    let server = TestServer::new().await;
    server.identity("Ayu", &[RoleName::Admin]).await;
    let sari = server.identity("Sari", &[RoleName::Staff]).await;
    let ayu = server.login("Ayu").await;
    let sari_token = server.login("Sari").await;

    assert_eq!(
        server.get("/api/roles", Some(&sari_token)).await.status,
        Status::Forbidden
    );

    let admin_role = server.role(RoleName::Admin).await;
    let assigned = server
        .post(
            "/api/role_user",
            Some(&ayu),
            json!({ "user_id": sari.id, "role_id": admin_role.id }),
        )
        .await;
    assert_eq!(assigned.status, Status::Ok);

    // Same token, fresh roles
    assert_eq!(
        server.get("/api/roles", Some(&sari_token)).await.status,
        Status::Ok
    );

    let held = server
        .get(&format!("/api/role_user/{}", sari.id), Some(&ayu))
        .await;
    let names: Vec<&str> = held.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|role| role["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"admin"));
    assert!(names.contains(&"staff"));
}

#[rocket::async_test]
async fn test_removed_role_is_denied_immediately() {
    let server = TestServer::new().await;
    server.identity("Ayu", &[RoleName::Admin]).await;
    let sari = server.identity("Sari", &[RoleName::Staff]).await;
    let ayu = server.login("Ayu").await;
    let sari_token = server.login("Sari").await;

    assert_eq!(
        server.get("/api/members", Some(&sari_token)).await.status,
        Status::Ok
    );

    let staff_role = server.role(RoleName::Staff).await;
    let removed = server
        .delete(
            &format!("/api/users/{}/roles/{}", sari.id, staff_role.id),
            Some(&ayu),
        )
        .await;
    assert_eq!(removed.status, Status::Ok);

    assert_eq!(
        server.get("/api/members", Some(&sari_token)).await.status,
        Status::Forbidden
    );
}

#[rocket::async_test]
async fn test_password_change_by_admin_revokes_target_sessions() {
    let server = TestServer::new().await;
    server.identity("Ayu", &[RoleName::Admin]).await;
    let sari = server.identity("Sari", &[RoleName::Staff]).await;
    let ayu = server.login("Ayu").await;
    let sari_token = server.login("Sari").await;

    let updated = server
        .patch(
            &format!("/api/users/{}", sari.id),
            Some(&ayu),
            json!({ "password": "rotated-pass" }),
        )
        .await;
    assert_eq!(updated.status, Status::Ok);
    assert_eq!(updated.body["data"]["token_version"], 1);

    assert_eq!(
        server.get("/api/profile", Some(&sari_token)).await.status,
        Status::Unauthorized
    );
}

#[rocket::async_test]
async fn test_role_crud() {
    let server = TestServer::new().await;
    server.identity("Ayu", &[RoleName::Admin]).await;
    let ayu = server.login("Ayu").await;

    let created = server
        .post("/api/roles", Some(&ayu), json!({ "name": "user" }))
        .await;
    assert_eq!(created.status, Status::Created);
    let id = created.body["data"]["id"].as_str().unwrap().to_string();

    let unknown = server
        .post("/api/roles", Some(&ayu), json!({ "name": "librarian" }))
        .await;
    assert_eq!(unknown.status, Status::BadRequest);

    let duplicate = server
        .post("/api/roles", Some(&ayu), json!({ "name": "user" }))
        .await;
    assert_eq!(duplicate.status, Status::Conflict);

    let renamed = server
        .patch(&format!("/api/roles/{id}"), Some(&ayu), json!({ "name": "staff" }))
        .await;
    assert_eq!(renamed.status, Status::Ok);
    assert_eq!(renamed.body["data"]["name"], "staff");

    assert_eq!(
        server.delete(&format!("/api/roles/{id}"), Some(&ayu)).await.status,
        Status::Ok
    );
    assert_eq!(
        server.get(&format!("/api/roles/{id}"), Some(&ayu)).await.status,
        Status::NotFound
    );
}
