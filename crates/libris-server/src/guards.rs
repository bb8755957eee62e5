//! Request guards
//!
//! | Guard | Admits |
//! |-------|--------|
//! | [`Authenticated`] | a request whose bearer token passes the validator |
//! | [`Gated<P>`] | an authenticated identity currently holding a role in `P::ROLES` |
//! | [`ApiQuota`] | a client still within its request window |
//!
//! A failing guard forwards the status to the matching catcher, which renders
//! the generic envelope for it.

use crate::constants::AUTHORIZATION_HEADER;
use crate::rate_limit::RateLimiter;
use libris_domain::entities::Identity;
use libris_domain::value_objects::RoleName;
use libris_infrastructure::AppContext;
use libris_infrastructure::auth::{
    ADMIN_ONLY, ANY_ROLE, AuthError, AuthFailureKind, Principal, STAFF_OR_ADMIN,
};
use rocket::Request;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Status rendered for an auth failure
pub fn status_for(err: &AuthError) -> Status {
    match err.kind() {
        AuthFailureKind::Unauthorized => Status::Unauthorized,
        AuthFailureKind::Forbidden => Status::Forbidden,
        AuthFailureKind::Unavailable => Status::ServiceUnavailable,
    }
}

fn app_context<'r>(request: &'r Request<'_>) -> Result<&'r Arc<AppContext>, AuthError> {
    request
        .rocket()
        .state::<Arc<AppContext>>()
        .ok_or_else(|| AuthError::Store("application context is not managed".to_string()))
}

/// Client key used for rate limiting
pub fn client_key(request: &Request<'_>) -> String {
    request
        .client_ip()
        .map_or_else(|| "unknown".to_string(), |ip| ip.to_string())
}

/// A request carrying a valid session token
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl Authenticated {
    /// Identity attached to the request
    pub fn identity(&self) -> &Identity {
        &self.0.identity
    }

    /// Identity id attached to the request
    pub fn identity_id(&self) -> &str {
        self.0.identity_id()
    }

    /// Exact token presented
    pub fn token(&self) -> &str {
        &self.0.token
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Authenticated {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        // Validated once per request, however many guards ask
        let result: &Result<Principal, AuthError> = request
            .local_cache_async(async {
                let ctx = app_context(request)?;
                let header = request.headers().get_one(AUTHORIZATION_HEADER);
                ctx.validator().validate(header).await
            })
            .await;

        match result {
            Ok(principal) => Outcome::Success(Authenticated(principal.clone())),
            Err(err) => Outcome::Error((status_for(err), err.clone())),
        }
    }
}

/// Role set a [`Gated`] route permits, fixed at route definition
pub trait Permits: Send + Sync + 'static {
    /// Permitted roles
    const ROLES: &'static [RoleName];
}

/// `admin`
#[derive(Debug)]
pub struct AdminOnly;

impl Permits for AdminOnly {
    const ROLES: &'static [RoleName] = ADMIN_ONLY;
}

/// `admin` or `staff`
#[derive(Debug)]
pub struct StaffOrAdmin;

impl Permits for StaffOrAdmin {
    const ROLES: &'static [RoleName] = STAFF_OR_ADMIN;
}

/// Any assigned role
#[derive(Debug)]
pub struct AnyRole;

impl Permits for AnyRole {
    const ROLES: &'static [RoleName] = ANY_ROLE;
}

/// Authenticated request whose identity holds one of `P::ROLES`
///
/// Roles come from a fresh lookup, never from the token.
#[derive(Debug)]
pub struct Gated<P: Permits> {
    /// Validated session
    pub principal: Principal,
    /// Identity snapshot with its current roles
    pub identity: Identity,
    _permits: PhantomData<P>,
}

impl<P: Permits> Gated<P> {
    /// Acting identity id
    pub fn actor_id(&self) -> &str {
        &self.identity.id
    }
}

#[rocket::async_trait]
impl<'r, P: Permits> FromRequest<'r> for Gated<P> {
    type Error = AuthError;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let principal = match request.guard::<Authenticated>().await {
            Outcome::Success(authenticated) => authenticated.0,
            Outcome::Error(e) => return Outcome::Error(e),
            Outcome::Forward(status) => return Outcome::Forward(status),
        };
        let ctx = match app_context(request) {
            Ok(ctx) => ctx,
            Err(e) => return Outcome::Error((status_for(&e), e)),
        };

        match ctx
            .gate()
            .authorize_by(Some(principal.identity_id()), P::ROLES, principal.budget_ends)
            .await
        {
            Ok(identity) => Outcome::Success(Gated {
                principal,
                identity,
                _permits: PhantomData,
            }),
            Err(e) => Outcome::Error((status_for(&e), e)),
        }
    }
}

/// Rate-limiting key of the calling client
#[derive(Debug, Clone)]
pub struct ClientAddr(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientAddr {
    type Error = std::convert::Infallible;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        Outcome::Success(ClientAddr(client_key(request)))
    }
}

/// Seconds a limited client should wait, read by the 429 catcher
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryAfter(pub u64);

/// Remember `wait` for the 429 catcher
pub fn note_retry_after(request: &Request<'_>, wait: Duration) {
    request.local_cache(|| RetryAfter(wait.as_secs().max(1)));
}

/// A client within its request quota
#[derive(Debug)]
pub struct ApiQuota;

/// Quota exhausted
#[derive(Debug)]
pub struct QuotaExceeded(pub Duration);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ApiQuota {
    type Error = QuotaExceeded;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(limiter) = request.rocket().state::<Arc<RateLimiter>>() else {
            return Outcome::Success(ApiQuota);
        };

        match limiter.check_request(&client_key(request)) {
            Ok(()) => Outcome::Success(ApiQuota),
            Err(wait) => {
                note_retry_after(request, wait);
                Outcome::Error((Status::TooManyRequests, QuotaExceeded(wait)))
            }
        }
    }
}
