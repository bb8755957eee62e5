//! Circulation routes

use crate::support::TestServer;
use libris_domain::value_objects::RoleName;
use rocket::http::Status;
use serde_json::json;

async fn created_id(
    server: &TestServer,
    token: &str,
    path: &str,
    body: serde_json::Value,
) -> String {
    let reply = server.post(path, Some(token), body).await;
    assert_eq!(reply.status, Status::Created);
    reply.body["data"]["id"].as_str().unwrap().to_string()
}

#[rocket::async_test]
async fn test_lend_and_return_over_http() {
    let server = TestServer::new().await;
    server.identity("Sari", &[RoleName::Staff]).await;
    server.identity("Umar", &[RoleName::User]).await;
    let staff = server.login("Sari").await;
    let reader = server.login("Umar").await;

    let member = created_id(
        &server,
        &staff,
        "/api/members",
        json!({ "name": "Dewi", "gender": "female", "class": "XII IPA 1", "phone": "081234567" }),
    )
    .await;
    let book = created_id(
        &server,
        &staff,
        "/api/books",
        json!({ "title": "Anak Semua Bangsa", "author": "Pramoedya", "publisher": "Hasta Mitra", "year": 1981 }),
    )
    .await;
    let loan = json!({
        "member_id": member,
        "book_id": book,
        "borrowed_on": "2025-03-01",
        "due_on": "2025-03-08"
    });

    assert_eq!(
        server.post("/api/circulations", Some(&reader), loan.clone()).await.status,
        Status::Forbidden
    );

    let lent = server.post("/api/circulations", Some(&staff), loan.clone()).await;
    assert_eq!(lent.status, Status::Created);
    assert_eq!(lent.body["data"]["code"], "SKL001");
    assert_eq!(lent.body["data"]["returned_on"], serde_json::Value::Null);
    let id = lent.body["data"]["id"].as_str().unwrap().to_string();

    // Same book while the first loan is open
    assert_eq!(
        server.post("/api/circulations", Some(&staff), loan).await.status,
        Status::Conflict
    );

    // Warm the cached snapshot, return, then read it back
    server.get(&format!("/api/circulations/{id}"), Some(&staff)).await;
    let returned = server
        .post(
            &format!("/api/circulations/{id}/return"),
            Some(&staff),
            json!({ "returned_on": "2025-03-10", "fine": 1000 }),
        )
        .await;
    assert_eq!(returned.status, Status::Ok);

    let fetched = server.get(&format!("/api/circulations/{id}"), Some(&staff)).await;
    assert_eq!(fetched.body["data"]["returned_on"], "2025-03-10");
    assert_eq!(fetched.body["data"]["fine"], 1000);

    let again = server
        .post(&format!("/api/circulations/{id}/return"), Some(&staff), json!({}))
        .await;
    assert_eq!(again.status, Status::BadRequest);
}

#[rocket::async_test]
async fn test_loan_for_unknown_member_is_not_found() {
    let server = TestServer::new().await;
    server.identity("Sari", &[RoleName::Staff]).await;
    let staff = server.login("Sari").await;
    let book = created_id(
        &server,
        &staff,
        "/api/books",
        json!({ "title": "Gadis Pantai", "author": "Pramoedya", "publisher": "Hasta Mitra", "year": 1987 }),
    )
    .await;

    let reply = server
        .post(
            "/api/circulations",
            Some(&staff),
            json!({
                "member_id": "nobody",
                "book_id": book,
                "borrowed_on": "2025-03-01",
                "due_on": "2025-03-08"
            }),
        )
        .await;
    assert_eq!(reply.status, Status::NotFound);

    let page = server.get("/api/circulations", Some(&staff)).await;
    assert_eq!(page.body["data"]["total"], 0);
}
