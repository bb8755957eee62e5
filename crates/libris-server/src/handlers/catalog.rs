//! Members and books
//!
//! Members are staff territory. Books can be read by any role and changed by
//! staff. Single-entity reads go through the cache-aside accessor.

use crate::guards::{AnyRole, ApiQuota, Gated, StaffOrAdmin};
use crate::payloads::{
    CreateBookRequest, CreateMemberRequest, UpdateBookRequest, UpdateMemberRequest, validated,
};
use crate::responses::{ApiResponse, ApiResult};
use libris_domain::value_objects::PageRequest;
use libris_infrastructure::AppContext;
use rocket::serde::json::Json;
use rocket::{State, delete, get, patch, post};
use std::sync::Arc;

#[get("/members?<page>")]
pub async fn list_members(
    page: Option<u32>,
    _quota: ApiQuota,
    _staff: Gated<StaffOrAdmin>,
    ctx: &State<Arc<AppContext>>,
) -> ApiResult {
    let request = PageRequest::new(page.unwrap_or(1));
    ApiResponse::ok(&ctx.members().list(request).await?)
}

#[get("/members/<id>")]
pub async fn get_member(
    id: &str,
    _quota: ApiQuota,
    _staff: Gated<StaffOrAdmin>,
    ctx: &State<Arc<AppContext>>,
) -> ApiResult {
    ApiResponse::ok(&ctx.members().get(id).await?)
}

#[post("/members", format = "json", data = "<body>")]
pub async fn create_member(
    _quota: ApiQuota,
    _staff: Gated<StaffOrAdmin>,
    ctx: &State<Arc<AppContext>>,
    body: Json<CreateMemberRequest>,
) -> ApiResult {
    let member = validated(body)?.into_new_member()?;
    ApiResponse::created(&ctx.members().create(member).await?)
}

#[patch("/members/<id>", format = "json", data = "<body>")]
pub async fn update_member(
    id: &str,
    _quota: ApiQuota,
    _staff: Gated<StaffOrAdmin>,
    ctx: &State<Arc<AppContext>>,
    body: Json<UpdateMemberRequest>,
) -> ApiResult {
    let patch = validated(body)?.into_patch()?;
    ApiResponse::ok(&ctx.members().update(id, patch).await?)
}

#[delete("/members/<id>")]
pub async fn delete_member(
    id: &str,
    _quota: ApiQuota,
    _staff: Gated<StaffOrAdmin>,
    ctx: &State<Arc<AppContext>>,
) -> ApiResult {
    ctx.members().delete(id).await?;
    Ok(ApiResponse::message("member deleted"))
}

#[get("/books?<page>")]
pub async fn list_books(
    page: Option<u32>,
    _quota: ApiQuota,
    _reader: Gated<AnyRole>,
    ctx: &State<Arc<AppContext>>,
) -> ApiResult {
    let request = PageRequest::new(page.unwrap_or(1));
    ApiResponse::ok(&ctx.books().list(request).await?)
}

#[get("/books/<id>")]
pub async fn get_book(
    id: &str,
    _quota: ApiQuota,
    _reader: Gated<AnyRole>,
    ctx: &State<Arc<AppContext>>,
) -> ApiResult {
    ApiResponse::ok(&ctx.books().get(id).await?)
}

#[post("/books", format = "json", data = "<body>")]
pub async fn create_book(
    _quota: ApiQuota,
    _staff: Gated<StaffOrAdmin>,
    ctx: &State<Arc<AppContext>>,
    body: Json<CreateBookRequest>,
) -> ApiResult {
    let book = validated(body)?;
    ApiResponse::created(&ctx.books().create(book.into()).await?)
}

#[patch("/books/<id>", format = "json", data = "<body>")]
pub async fn update_book(
    id: &str,
    _quota: ApiQuota,
    _staff: Gated<StaffOrAdmin>,
    ctx: &State<Arc<AppContext>>,
    body: Json<UpdateBookRequest>,
) -> ApiResult {
    let patch = validated(body)?;
    ApiResponse::ok(&ctx.books().update(id, patch.into()).await?)
}

#[delete("/books/<id>")]
pub async fn delete_book(
    id: &str,
    _quota: ApiQuota,
    _staff: Gated<StaffOrAdmin>,
    ctx: &State<Arc<AppContext>>,
) -> ApiResult {
    ctx.books().delete(id).await?;
    Ok(ApiResponse::message("book deleted"))
}
