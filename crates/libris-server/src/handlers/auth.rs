//! Login, registration, logout and profile

use crate::guards::{ApiQuota, Authenticated, ClientAddr};
use crate::payloads::{LoginRequest, RegisterRequest, validated};
use crate::rate_limit::RateLimiter;
use crate::responses::{ApiError, ApiResponse, ApiResult};
use libris_infrastructure::AppContext;
use libris_infrastructure::auth::AuthError;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Exchange email and password for a session token
///
/// Unknown email and wrong password produce the same 401. Repeated failures
/// from one client lock it out of this route for a while.
#[post("/login", format = "json", data = "<body>")]
pub async fn login(
    _quota: ApiQuota,
    client: ClientAddr,
    ctx: &State<Arc<AppContext>>,
    limiter: &State<Arc<RateLimiter>>,
    body: Json<LoginRequest>,
) -> ApiResult {
    if let Some(wait) = limiter.login_lockout(&client.0) {
        return Err(ApiError::too_many_requests(wait.as_secs()));
    }
    let body = validated(body)?;

    match ctx.authenticator().login(&body.email, &body.password).await {
        Ok(issued) => {
            limiter.record_successful_login(&client.0);
            Ok(ApiResponse::token(issued.token).with_message("login successful"))
        }
        Err(AuthError::InvalidCredentials) => match limiter.record_failed_login(&client.0) {
            Some(lockout) => Err(ApiError::too_many_requests(lockout.as_secs())),
            None => Err(ApiError::unauthorized()),
        },
        Err(e) => Err(e.into()),
    }
}

/// Create an identity with no roles
#[post("/register", format = "json", data = "<body>")]
pub async fn register(
    _quota: ApiQuota,
    ctx: &State<Arc<AppContext>>,
    body: Json<RegisterRequest>,
) -> ApiResult {
    let body = validated(body)?;
    let identity = ctx
        .authenticator()
        .register(&body.name, &body.email, &body.password)
        .await?;
    Ok(ApiResponse::created(&identity)?.with_message("registration successful"))
}

/// Revoke the presented token only
#[post("/logout")]
pub async fn logout(
    _quota: ApiQuota,
    session: Authenticated,
    ctx: &State<Arc<AppContext>>,
) -> ApiResult {
    ctx.revocation().logout(session.token()).await?;
    Ok(ApiResponse::message("logout successful"))
}

#[derive(Serialize)]
struct RevokedAll {
    token_version: i64,
}

/// Revoke every token of the caller
#[post("/logout-all")]
pub async fn logout_all(
    _quota: ApiQuota,
    session: Authenticated,
    ctx: &State<Arc<AppContext>>,
) -> ApiResult {
    let token_version = ctx
        .revocation()
        .revoke_all(session.identity_id(), Some(session.token()))
        .await?;
    info!(identity_id = session.identity_id(), "Logged out everywhere");
    Ok(ApiResponse::ok(&RevokedAll { token_version })?.with_message("all sessions revoked"))
}

/// The caller's own identity, with current roles
#[get("/profile")]
pub async fn profile(_quota: ApiQuota, session: Authenticated) -> ApiResult {
    ApiResponse::ok(session.identity())
}
