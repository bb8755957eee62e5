//! Token validation
//!
//! Steps, in order, each failing closed:
//!
//! 1. Extract the bearer credential
//! 2. Verify signature and algorithm (HS256 only)
//! 3. Require the Active-Session Marker for the exact token
//! 4. Resolve the subject identity through the cache-aside accessor
//! 5. Compare the claim `token_version` with the identity's current one
//! 6. Reject once `now >= exp`
//! 7. Return the authenticated principal
//!
//! The whole sequence runs under a deadline. The same budget carries over to
//! the role gate through [`Principal::budget_ends`], so a gated request is
//! bounded by one deadline in total. Every rejection is logged with its
//! cause; callers only ever see an unauthorized outcome.

use super::claims::Claims;
use super::error::AuthError;
use super::keys::SigningKeys;
use crate::cache::SessionStore;
use crate::constants::BEARER_SCHEME;
use chrono::Utc;
use libris_domain::entities::Identity;
use libris_domain::repositories::IdentityRepository;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Result of a successful validation
#[derive(Debug, Clone)]
pub struct Principal {
    /// Resolved identity (current roles and version)
    pub identity: Identity,
    /// The exact token presented
    pub token: String,
    /// Its verified claims
    pub claims: Claims,
    /// When the request's authorization budget runs out
    pub budget_ends: Instant,
}

impl Principal {
    /// Identity id attached to the request
    pub fn identity_id(&self) -> &str {
        &self.identity.id
    }
}

/// Extract the token from an `Authorization` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.ok_or(AuthError::MissingCredential)?.trim();
    let (scheme, token) = value
        .split_once(' ')
        .ok_or(AuthError::MissingCredential)?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AuthError::MissingCredential);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }
    Ok(token)
}

/// Validates presented session tokens
pub struct TokenValidator {
    identities: Arc<dyn IdentityRepository>,
    sessions: SessionStore,
    keys: SigningKeys,
    deadline: Duration,
}

impl TokenValidator {
    /// Create a validator
    ///
    /// `identities` should be the cache-aside decorated repository.
    pub fn new(
        identities: Arc<dyn IdentityRepository>,
        sessions: SessionStore,
        keys: SigningKeys,
        deadline: Duration,
    ) -> Self {
        Self {
            identities,
            sessions,
            keys,
            deadline,
        }
    }

    /// Validate an `Authorization` header value at the current time
    pub async fn validate(&self, authorization: Option<&str>) -> Result<Principal, AuthError> {
        self.validate_at(authorization, Utc::now().timestamp()).await
    }

    /// Validate an `Authorization` header value as of `now` (epoch seconds)
    pub async fn validate_at(
        &self,
        authorization: Option<&str>,
        now: i64,
    ) -> Result<Principal, AuthError> {
        let budget_ends = Instant::now() + self.deadline;
        let outcome =
            tokio::time::timeout_at(budget_ends, self.run(authorization, now, budget_ends))
                .await
                .unwrap_or(Err(AuthError::DeadlineExceeded));

        match &outcome {
            Ok(principal) => debug!(identity_id = principal.identity_id(), "Token accepted"),
            Err(e) => warn!(cause = e.cause(), error = %e, "Token rejected"),
        }
        outcome
    }

    async fn run(
        &self,
        authorization: Option<&str>,
        now: i64,
        budget_ends: Instant,
    ) -> Result<Principal, AuthError> {
        let token = bearer_token(authorization)?;
        let claims = self.keys.verify(token)?;

        match self.sessions.contains(token).await {
            Ok(true) => {}
            Ok(false) => return Err(AuthError::RevokedOrExpired),
            Err(e) => {
                warn!(error = %e, "Session marker lookup failed, rejecting");
                return Err(AuthError::RevokedOrExpired);
            }
        }

        let identity = self
            .identities
            .get_by_id(&claims.sub)
            .await
            .map_err(|e| AuthError::IdentityUnresolved(e.to_string()))?
            .ok_or(AuthError::IdentityNotFound)?;

        if claims.token_version != identity.token_version {
            return Err(AuthError::Revoked);
        }

        if claims.is_expired_at(now) {
            return Err(AuthError::Expired);
        }

        Ok(Principal {
            identity,
            token: token.to_string(),
            claims,
            budget_ends,
        })
    }

    /// Configured deadline
    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}
