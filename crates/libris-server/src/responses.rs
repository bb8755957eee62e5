//! Response envelope and error mapping
//!
//! Every body has the shape `{ "code", "status", "message"?, "data"?, "token"? }`.
//! Errors carry an `error` detail only when the server is not in production
//! mode; authentication and authorization failures never reveal their cause.

use libris_domain::error::Error;
use libris_infrastructure::AppContext;
use libris_infrastructure::auth::{AuthError, AuthFailureKind};
use rocket::http::{Header, Status};
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::Request;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};

/// JSON body shared by every response
#[derive(Debug, Serialize)]
pub struct Envelope {
    /// HTTP status code
    pub code: u16,
    /// HTTP reason phrase
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Internal detail, omitted in production
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    fn for_status(status: Status) -> Self {
        Self {
            code: status.code,
            status: status.reason_lossy().to_string(),
            message: None,
            data: None,
            token: None,
            error: None,
        }
    }
}

/// Successful response
#[derive(Debug)]
pub struct ApiResponse {
    status: Status,
    envelope: Envelope,
}

impl ApiResponse {
    /// 200 with `data`
    pub fn ok<T: Serialize>(data: &T) -> Result<Self, ApiError> {
        Self::with_status(Status::Ok, data)
    }

    /// 201 with `data`
    pub fn created<T: Serialize>(data: &T) -> Result<Self, ApiError> {
        Self::with_status(Status::Created, data)
    }

    /// 200 with a message and no data
    pub fn message(message: impl Into<String>) -> Self {
        let mut envelope = Envelope::for_status(Status::Ok);
        envelope.message = Some(message.into());
        Self {
            status: Status::Ok,
            envelope,
        }
    }

    /// 200 carrying a freshly issued token
    pub fn token(token: String) -> Self {
        let mut envelope = Envelope::for_status(Status::Ok);
        envelope.token = Some(token);
        Self {
            status: Status::Ok,
            envelope,
        }
    }

    /// Attach a message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.envelope.message = Some(message.into());
        self
    }

    fn with_status<T: Serialize>(status: Status, data: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(data).map_err(|e| ApiError::internal(e.to_string()))?;
        let mut envelope = Envelope::for_status(status);
        envelope.data = Some(value);
        Ok(Self { status, envelope })
    }
}

impl<'r> Responder<'r, 'static> for ApiResponse {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        (self.status, Json(self.envelope)).respond_to(request)
    }
}

/// Handler result
pub type ApiResult = Result<ApiResponse, ApiError>;

/// Failed response
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Response status
    pub status: Status,
    /// Public message
    pub message: Option<String>,
    /// Internal detail, shown outside production only
    pub detail: Option<String>,
    /// `Retry-After` seconds for 429 responses
    pub retry_after: Option<u64>,
}

impl ApiError {
    /// Error with a public message
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
            detail: None,
            retry_after: None,
        }
    }

    /// Bare status, no message
    pub fn status(status: Status) -> Self {
        Self {
            status,
            message: None,
            detail: None,
            retry_after: None,
        }
    }

    /// Generic 401
    pub fn unauthorized() -> Self {
        Self::new(Status::Unauthorized, "unauthorized")
    }

    /// Generic 403
    pub fn forbidden() -> Self {
        Self::new(Status::Forbidden, "forbidden")
    }

    /// 400 with a public message
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(Status::BadRequest, message)
    }

    /// 500 whose detail is hidden in production
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: Status::InternalServerError,
            message: None,
            detail: Some(detail.into()),
            retry_after: None,
        }
    }

    /// 429 with `Retry-After`
    pub fn too_many_requests(retry_after_secs: u64) -> Self {
        Self {
            status: Status::TooManyRequests,
            message: Some("too many requests".to_string()),
            detail: None,
            retry_after: Some(retry_after_secs.max(1)),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err.kind() {
            AuthFailureKind::Unauthorized => Self::unauthorized(),
            AuthFailureKind::Forbidden => Self::forbidden(),
            AuthFailureKind::Unavailable => {
                error!(cause = err.cause(), error = %err, "Auth backend unavailable");
                Self {
                    status: Status::ServiceUnavailable,
                    message: None,
                    detail: Some(err.to_string()),
                    retry_after: None,
                }
            }
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match &err {
            Error::NotFound { .. } => Self {
                detail: Some(err.to_string()),
                ..Self::new(Status::NotFound, "not found")
            },
            Error::AlreadyExists { message } => Self::new(Status::Conflict, message.clone()),
            Error::InvalidArgument { message } => Self::bad_request(message.clone()),
            Error::Forbidden { .. } => {
                warn!(error = %err, "Operation forbidden");
                Self::forbidden()
            }
            Error::Authentication { .. } => Self::unauthorized(),
            _ => {
                error!(error = %err, "Request failed");
                Self::internal(err.to_string())
            }
        }
    }
}

fn is_production(request: &Request<'_>) -> bool {
    request
        .rocket()
        .state::<Arc<AppContext>>()
        .is_none_or(|ctx| ctx.config.server.production)
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let mut envelope = Envelope::for_status(self.status);
        envelope.message = self.message;
        if !is_production(request) {
            envelope.error = self.detail;
        }

        let mut response = (self.status, Json(envelope)).respond_to(request)?;
        if let Some(secs) = self.retry_after {
            response.set_header(Header::new("Retry-After", secs.to_string()));
        }
        Ok(response)
    }
}
