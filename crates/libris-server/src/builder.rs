//! Rocket assembly
//!
//! Mounts every route under [`API_PREFIX`], registers the envelope catchers
//! and manages the shared [`AppContext`] and [`RateLimiter`].

use crate::constants::API_PREFIX;
use crate::guards::RetryAfter;
use crate::handlers::{auth, catalog, circulation, health, roles, users};
use crate::rate_limit::RateLimiter;
use crate::responses::ApiError;
use libris_infrastructure::AppContext;
use rocket::config::LogLevel;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Status;
use rocket::{Build, Request, Response, Rocket, catch, catchers, routes};
use std::sync::Arc;
use tracing::{debug, warn};

/// Build the Rocket instance for `ctx`
///
/// Binds to `server.address`/`server.port` from the application config.
pub fn build_rocket(ctx: Arc<AppContext>) -> Rocket<Build> {
    let server = &ctx.config.server;
    let figment = rocket::Config::figment()
        .merge(("address", server.address.clone()))
        .merge(("port", server.port))
        .merge(("log_level", LogLevel::Critical));
    let limiter = Arc::new(RateLimiter::new(ctx.config.rate_limit.clone()));

    rocket::custom(figment)
        .manage(ctx)
        .manage(limiter)
        .attach(RequestLog)
        .mount(
            API_PREFIX,
            routes![
                auth::login,
                auth::register,
                auth::logout,
                auth::logout_all,
                auth::profile,
                users::list_users,
                users::get_user,
                users::create_user,
                users::update_user,
                users::delete_user,
                roles::list_roles,
                roles::get_role,
                roles::create_role,
                roles::rename_role,
                roles::delete_role,
                roles::roles_of_user,
                roles::assign_role,
                roles::remove_role,
                catalog::list_members,
                catalog::get_member,
                catalog::create_member,
                catalog::update_member,
                catalog::delete_member,
                catalog::list_books,
                catalog::get_book,
                catalog::create_book,
                catalog::update_book,
                catalog::delete_book,
                circulation::list_circulations,
                circulation::get_circulation,
                circulation::borrow_book,
                circulation::return_book,
                circulation::update_circulation,
                circulation::delete_circulation,
                health::health,
            ],
        )
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized,
                forbidden,
                not_found,
                unprocessable,
                too_many_requests,
                service_unavailable,
                internal_error,
                fallback,
            ],
        )
}

/// Logs every response through `tracing`
pub struct RequestLog;

#[rocket::async_trait]
impl Fairing for RequestLog {
    fn info(&self) -> Info {
        Info {
            name: "Request log",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let status = response.status().code;
        let method = request.method().as_str();
        let path = request.uri().path().as_str();
        if status >= 500 {
            warn!(method, path, status, "Request failed");
        } else {
            debug!(method, path, status, "Request served");
        }
    }
}

#[catch(400)]
fn bad_request() -> ApiError {
    ApiError::bad_request("bad request")
}

#[catch(401)]
fn unauthorized() -> ApiError {
    ApiError::unauthorized()
}

#[catch(403)]
fn forbidden() -> ApiError {
    ApiError::forbidden()
}

#[catch(404)]
fn not_found() -> ApiError {
    ApiError::new(Status::NotFound, "not found")
}

#[catch(422)]
fn unprocessable() -> ApiError {
    ApiError::new(Status::UnprocessableEntity, "request body could not be parsed")
}

#[catch(429)]
fn too_many_requests(request: &Request<'_>) -> ApiError {
    let RetryAfter(secs) = *request.local_cache(RetryAfter::default);
    ApiError::too_many_requests(secs)
}

#[catch(503)]
fn service_unavailable() -> ApiError {
    ApiError::status(Status::ServiceUnavailable)
}

#[catch(500)]
fn internal_error() -> ApiError {
    ApiError::status(Status::InternalServerError)
}

#[catch(default)]
fn fallback(status: Status, _request: &Request<'_>) -> ApiError {
    ApiError::status(status)
}
