//! Member and book routes

use crate::support::TestServer;
use libris_domain::value_objects::RoleName;
use rocket::http::Status;
use serde_json::json;

#[rocket::async_test]
async fn test_any_role_reads_books_but_only_staff_writes() {
    let server = TestServer::new().await;
    server.identity("Sari", &[RoleName::Staff]).await;
    server.identity("Umar", &[RoleName::User]).await;
    let staff = server.login("Sari").await;
    let reader = server.login("Umar").await;

    let book = json!({
        "title": "Bumi Manusia",
        "author": "Pramoedya Ananta Toer",
        "publisher": "Hasta Mitra",
        "year": 1980
    });
    assert_eq!(
        server.post("/api/books", Some(&reader), book.clone()).await.status,
        Status::Forbidden
    );

    let created = server.post("/api/books", Some(&staff), book).await;
    assert_eq!(created.status, Status::Created);
    assert_eq!(created.body["data"]["code"], "BK001");
    let id = created.body["data"]["id"].as_str().unwrap().to_string();

    let fetched = server.get(&format!("/api/books/{id}"), Some(&reader)).await;
    assert_eq!(fetched.status, Status::Ok);
    assert_eq!(fetched.body["data"]["title"], "Bumi Manusia");

    let page = server.get("/api/books?page=1", Some(&reader)).await;
    assert_eq!(page.body["data"]["total"], 1);
}

#[rocket::async_test]
async fn test_identity_without_roles_is_denied_books() {
    let server = TestServer::new().await;
    server.identity("Nina", &[]).await;
    let token = server.login("Nina").await;

    assert_eq!(
        server.get("/api/books", Some(&token)).await.status,
        Status::Forbidden
    );
}

#[rocket::async_test]
async fn test_member_lifecycle() {
    let server = TestServer::new().await;
    server.identity("Sari", &[RoleName::Staff]).await;
    let staff = server.login("Sari").await;

    let created = server
        .post(
            "/api/members",
            Some(&staff),
            json!({ "name": "Dewi", "gender": "female", "class": "XII IPA 1", "phone": "081234567" }),
        )
        .await;
    assert_eq!(created.status, Status::Created);
    assert_eq!(created.body["data"]["code"], "ID001");
    let id = created.body["data"]["id"].as_str().unwrap().to_string();

    let clash = server
        .post(
            "/api/members",
            Some(&staff),
            json!({ "name": "Dewi", "gender": "female", "class": "XI", "phone": "089999999" }),
        )
        .await;
    assert_eq!(clash.status, Status::Conflict);

    let bad_gender = server
        .post(
            "/api/members",
            Some(&staff),
            json!({ "name": "Eko", "gender": "x", "class": "XI", "phone": "087777777" }),
        )
        .await;
    assert_eq!(bad_gender.status, Status::BadRequest);

    let updated = server
        .patch(
            &format!("/api/members/{id}"),
            Some(&staff),
            json!({ "class": "XII IPS 2" }),
        )
        .await;
    assert_eq!(updated.body["data"]["class"], "XII IPS 2");

    let fetched = server.get(&format!("/api/members/{id}"), Some(&staff)).await;
    assert_eq!(fetched.body["data"]["class"], "XII IPS 2");

    assert_eq!(
        server
            .delete(&format!("/api/members/{id}"), Some(&staff))
            .await
            .status,
        Status::Ok
    );
    assert_eq!(
        server.get(&format!("/api/members/{id}"), Some(&staff)).await.status,
        Status::NotFound
    );
}
