//! Lending books to members; staff only

use crate::guards::{ApiQuota, Gated, StaffOrAdmin};
use crate::payloads::{BorrowRequest, ReturnRequest, UpdateCirculationRequest, validated};
use crate::responses::{ApiResponse, ApiResult};
use libris_domain::value_objects::PageRequest;
use libris_infrastructure::AppContext;
use rocket::serde::json::Json;
use rocket::{State, delete, get, patch, post};
use std::sync::Arc;

#[get("/circulations?<page>")]
pub async fn list_circulations(
    page: Option<u32>,
    _quota: ApiQuota,
    _staff: Gated<StaffOrAdmin>,
    ctx: &State<Arc<AppContext>>,
) -> ApiResult {
    let request = PageRequest::new(page.unwrap_or(1));
    ApiResponse::ok(&ctx.circulations().list(request).await?)
}

#[get("/circulations/<id>")]
pub async fn get_circulation(
    id: &str,
    _quota: ApiQuota,
    _staff: Gated<StaffOrAdmin>,
    ctx: &State<Arc<AppContext>>,
) -> ApiResult {
    ApiResponse::ok(&ctx.circulations().get(id).await?)
}

#[post("/circulations", format = "json", data = "<body>")]
pub async fn borrow_book(
    _quota: ApiQuota,
    _staff: Gated<StaffOrAdmin>,
    ctx: &State<Arc<AppContext>>,
    body: Json<BorrowRequest>,
) -> ApiResult {
    let loan = validated(body)?;
    ApiResponse::created(&ctx.circulations().borrow(loan.into()).await?)
}

/// An empty body returns the book today without a fine
#[post("/circulations/<id>/return", format = "json", data = "<body>")]
pub async fn return_book(
    id: &str,
    _quota: ApiQuota,
    _staff: Gated<StaffOrAdmin>,
    ctx: &State<Arc<AppContext>>,
    body: Json<ReturnRequest>,
) -> ApiResult {
    let returned = validated(body)?;
    ApiResponse::ok(&ctx.circulations().return_book(id, returned.into()).await?)
}

#[patch("/circulations/<id>", format = "json", data = "<body>")]
pub async fn update_circulation(
    id: &str,
    _quota: ApiQuota,
    _staff: Gated<StaffOrAdmin>,
    ctx: &State<Arc<AppContext>>,
    body: Json<UpdateCirculationRequest>,
) -> ApiResult {
    let patch = validated(body)?;
    ApiResponse::ok(&ctx.circulations().update(id, patch.into()).await?)
}

#[delete("/circulations/<id>")]
pub async fn delete_circulation(
    id: &str,
    _quota: ApiQuota,
    _staff: Gated<StaffOrAdmin>,
    ctx: &State<Arc<AppContext>>,
) -> ApiResult {
    ctx.circulations().delete(id).await?;
    Ok(ApiResponse::message("circulation deleted"))
}
