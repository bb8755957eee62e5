//! Response envelope, catchers and health

use crate::support::{TestServer, test_config};
use libris_domain::value_objects::RoleName;
use rocket::http::{ContentType, Status};
use serde_json::json;

#[rocket::async_test]
async fn test_health_is_public() {
    let server = TestServer::new().await;
    let reply = server.get("/api/health", None).await;
    assert_eq!(reply.status, Status::Ok);
    assert_eq!(reply.body["status"], "up");
}

#[rocket::async_test]
async fn test_unknown_route_uses_envelope() {
    let server = TestServer::new().await;
    let reply = server.get("/api/nowhere", None).await;
    assert_eq!(reply.status, Status::NotFound);
    assert_eq!(reply.body["code"], 404);
    assert_eq!(reply.body["status"], "Not Found");
}

#[rocket::async_test]
async fn test_unparseable_body_is_422() {
    let server = TestServer::new().await;
    let response = server
        .client
        .post("/api/login")
        .header(ContentType::JSON)
        .body("{ not json")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);
}

#[rocket::async_test]
async fn test_error_detail_only_outside_production() {
    let production = TestServer::new().await;
    production.identity("Ayu", &[RoleName::Admin]).await;
    let token = production.login("Ayu").await;
    let hidden = production.get("/api/users/missing", Some(&token)).await;
    assert_eq!(hidden.status, Status::NotFound);
    assert!(hidden.body.get("error").is_none());

    let mut config = test_config();
    config.server.production = false;
    let development = TestServer::with_config(config).await;
    development.identity("Ayu", &[RoleName::Admin]).await;
    let token = development.login("Ayu").await;
    let shown = development.get("/api/users/missing", Some(&token)).await;
    assert_eq!(shown.status, Status::NotFound);
    assert_eq!(shown.body["error"], json!("Not found: user:missing"));
}
