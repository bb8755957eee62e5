//! Identity administration (admin only)

use crate::guards::{AdminOnly, ApiQuota, Gated};
use crate::payloads::{CreateUserRequest, UpdateUserRequest, validated};
use crate::responses::{ApiResponse, ApiResult};
use libris_infrastructure::AppContext;
use rocket::serde::json::Json;
use rocket::{State, delete, get, patch, post};
use std::sync::Arc;

#[get("/users")]
pub async fn list_users(
    _quota: ApiQuota,
    _admin: Gated<AdminOnly>,
    ctx: &State<Arc<AppContext>>,
) -> ApiResult {
    ApiResponse::ok(&ctx.users().list().await?)
}

#[get("/users/<id>")]
pub async fn get_user(
    id: &str,
    _quota: ApiQuota,
    _admin: Gated<AdminOnly>,
    ctx: &State<Arc<AppContext>>,
) -> ApiResult {
    ApiResponse::ok(&ctx.users().get(id).await?)
}

#[post("/users", format = "json", data = "<body>")]
pub async fn create_user(
    _quota: ApiQuota,
    _admin: Gated<AdminOnly>,
    ctx: &State<Arc<AppContext>>,
    body: Json<CreateUserRequest>,
) -> ApiResult {
    let body = validated(body)?;
    let created = ctx.users().create(body.into()).await?;
    ApiResponse::created(&created)
}

/// Update an identity
///
/// Another admin cannot be modified; a password change revokes the
/// target's sessions.
#[patch("/users/<id>", format = "json", data = "<body>")]
pub async fn update_user(
    id: &str,
    _quota: ApiQuota,
    admin: Gated<AdminOnly>,
    ctx: &State<Arc<AppContext>>,
    body: Json<UpdateUserRequest>,
) -> ApiResult {
    let body = validated(body)?;
    let updated = ctx
        .users()
        .update(admin.actor_id(), id, body.into())
        .await?;
    ApiResponse::ok(&updated)
}

#[delete("/users/<id>")]
pub async fn delete_user(
    id: &str,
    _quota: ApiQuota,
    admin: Gated<AdminOnly>,
    ctx: &State<Arc<AppContext>>,
) -> ApiResult {
    ctx.users().delete(admin.actor_id(), id).await?;
    Ok(ApiResponse::message("user deleted"))
}
