//! Liveness and dependency health

use libris_infrastructure::AppContext;
use libris_infrastructure::health::HealthResponse;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, get};
use std::sync::Arc;

/// Dependency report; 503 when the service cannot serve requests
#[get("/health")]
pub async fn health(ctx: &State<Arc<AppContext>>) -> (Status, Json<HealthResponse>) {
    let report = ctx.health().check().await;
    let status = if report.status.is_operational() {
        Status::Ok
    } else {
        Status::ServiceUnavailable
    };
    (status, Json(report))
}
