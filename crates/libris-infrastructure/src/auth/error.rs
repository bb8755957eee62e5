//! Authentication and authorization failures
//!
//! Each variant names one cause. Callers outside the auth core only see the
//! [`AuthFailureKind`]: every authentication cause renders the same 401, every
//! authorization cause the same 403. The cause itself is logged.

use libris_domain::error::Error;
use thiserror::Error;

/// How a failure is presented externally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailureKind {
    /// Generic "unauthorized"
    Unauthorized,
    /// Generic "forbidden"
    Forbidden,
    /// A backing store could not complete the operation
    Unavailable,
}

/// Auth core error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization: Bearer` credential on the request
    #[error("missing bearer credential")]
    MissingCredential,

    /// Token could not be parsed or lacks required claims
    #[error("malformed token: {0}")]
    Malformed(String),

    /// Signature does not verify under the signing secret
    #[error("invalid token signature")]
    InvalidSignature,

    /// Header names an algorithm other than HS256
    #[error("unexpected token algorithm")]
    UnexpectedAlgorithm,

    /// No Active-Session Marker for the token, or the marker store could not answer
    #[error("session revoked or expired")]
    RevokedOrExpired,

    /// Subject identity does not exist
    #[error("identity not found")]
    IdentityNotFound,

    /// Subject identity could not be loaded
    #[error("identity could not be resolved: {0}")]
    IdentityUnresolved(String),

    /// Claim `token_version` differs from the durable one
    #[error("token version revoked")]
    Revoked,

    /// `now >= exp`
    #[error("token expired")]
    Expired,

    /// Validation or gating did not finish within the deadline
    #[error("authentication deadline exceeded")]
    DeadlineExceeded,

    /// No authenticated identity attached to the request
    #[error("unauthenticated")]
    Unauthenticated,

    /// Unknown email or wrong password
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Identity lacks every permitted role, or the target is a protected admin
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Token could not be signed
    #[error("token signing failed: {0}")]
    SigningError(String),

    /// Active-Session Marker could not be written or deleted
    #[error("session store unavailable: {0}")]
    SessionStoreUnavailable(String),

    /// Durable store failed outside token validation
    #[error("store failure: {0}")]
    Store(String),
}

impl AuthError {
    /// External classification
    pub fn kind(&self) -> AuthFailureKind {
        match self {
            AuthError::Forbidden(_) => AuthFailureKind::Forbidden,
            AuthError::SigningError(_)
            | AuthError::SessionStoreUnavailable(_)
            | AuthError::Store(_) => AuthFailureKind::Unavailable,
            _ => AuthFailureKind::Unauthorized,
        }
    }

    /// Short machine-readable cause for logs
    pub fn cause(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::Malformed(_) => "malformed",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::UnexpectedAlgorithm => "unexpected_algorithm",
            AuthError::RevokedOrExpired => "revoked_or_expired",
            AuthError::IdentityNotFound => "identity_not_found",
            AuthError::IdentityUnresolved(_) => "identity_unresolved",
            AuthError::Revoked => "revoked",
            AuthError::Expired => "expired",
            AuthError::DeadlineExceeded => "deadline_exceeded",
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Forbidden(_) => "forbidden",
            AuthError::SigningError(_) => "signing_error",
            AuthError::SessionStoreUnavailable(_) => "session_store_unavailable",
            AuthError::Store(_) => "store",
        }
    }

    /// Whether this is an authentication (401) failure
    pub fn is_unauthorized(&self) -> bool {
        self.kind() == AuthFailureKind::Unauthorized
    }

    /// Whether this is an authorization (403) failure
    pub fn is_forbidden(&self) -> bool {
        self.kind() == AuthFailureKind::Forbidden
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        match err.kind() {
            AuthFailureKind::Unauthorized => Error::authentication(err.to_string()),
            AuthFailureKind::Forbidden => Error::forbidden(err.to_string()),
            AuthFailureKind::Unavailable => Error::infrastructure(err.to_string()),
        }
    }
}
