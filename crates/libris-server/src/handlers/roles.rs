//! Roles and role assignment (admin only)

use crate::guards::{AdminOnly, ApiQuota, Gated};
use crate::payloads::{AssignRoleRequest, RoleRequest, validated};
use crate::responses::{ApiResponse, ApiResult};
use libris_infrastructure::AppContext;
use rocket::serde::json::Json;
use rocket::{State, delete, get, patch, post};
use std::sync::Arc;

#[get("/roles")]
pub async fn list_roles(
    _quota: ApiQuota,
    _admin: Gated<AdminOnly>,
    ctx: &State<Arc<AppContext>>,
) -> ApiResult {
    ApiResponse::ok(&ctx.roles().list().await?)
}

#[get("/roles/<id>")]
pub async fn get_role(
    id: &str,
    _quota: ApiQuota,
    _admin: Gated<AdminOnly>,
    ctx: &State<Arc<AppContext>>,
) -> ApiResult {
    ApiResponse::ok(&ctx.roles().get(id).await?)
}

#[post("/roles", format = "json", data = "<body>")]
pub async fn create_role(
    _quota: ApiQuota,
    _admin: Gated<AdminOnly>,
    ctx: &State<Arc<AppContext>>,
    body: Json<RoleRequest>,
) -> ApiResult {
    let name = validated(body)?.role_name()?;
    ApiResponse::created(&ctx.roles().create(name).await?)
}

#[patch("/roles/<id>", format = "json", data = "<body>")]
pub async fn rename_role(
    id: &str,
    _quota: ApiQuota,
    admin: Gated<AdminOnly>,
    ctx: &State<Arc<AppContext>>,
    body: Json<RoleRequest>,
) -> ApiResult {
    let name = validated(body)?.role_name()?;
    ApiResponse::ok(&ctx.roles().rename(admin.actor_id(), id, name).await?)
}

#[delete("/roles/<id>")]
pub async fn delete_role(
    id: &str,
    _quota: ApiQuota,
    admin: Gated<AdminOnly>,
    ctx: &State<Arc<AppContext>>,
) -> ApiResult {
    ctx.roles().delete(admin.actor_id(), id).await?;
    Ok(ApiResponse::message("role deleted"))
}

/// Roles currently held by an identity
#[get("/role_user/<user_id>")]
pub async fn roles_of_user(
    user_id: &str,
    _quota: ApiQuota,
    _admin: Gated<AdminOnly>,
    ctx: &State<Arc<AppContext>>,
) -> ApiResult {
    ApiResponse::ok(&ctx.roles().roles_of(user_id).await?)
}

#[post("/role_user", format = "json", data = "<body>")]
pub async fn assign_role(
    _quota: ApiQuota,
    admin: Gated<AdminOnly>,
    ctx: &State<Arc<AppContext>>,
    body: Json<AssignRoleRequest>,
) -> ApiResult {
    let body = validated(body)?;
    ctx.roles()
        .assign(admin.actor_id(), &body.user_id, &body.role_id)
        .await?;
    Ok(ApiResponse::message("role assigned"))
}

#[delete("/users/<user_id>/roles/<role_id>")]
pub async fn remove_role(
    user_id: &str,
    role_id: &str,
    _quota: ApiQuota,
    admin: Gated<AdminOnly>,
    ctx: &State<Arc<AppContext>>,
) -> ApiResult {
    ctx.roles()
        .remove(admin.actor_id(), user_id, role_id)
        .await?;
    Ok(ApiResponse::message("role removed"))
}
