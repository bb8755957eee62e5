//! Token issuance
//!
//! Mints an HS256 session token for an already authenticated identity and
//! registers its Active-Session Marker. A token whose marker could not be
//! written is never handed out.

use super::claims::Claims;
use super::error::AuthError;
use super::keys::SigningKeys;
use crate::cache::SessionStore;
use chrono::Utc;
use libris_domain::entities::Identity;
use libris_domain::repositories::IdentityRepository;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// A freshly issued session token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Encoded JWT
    pub token: String,
    /// Claims it carries
    pub claims: Claims,
    /// Identity snapshot it was issued from
    pub identity: Identity,
}

/// Mints session tokens
pub struct TokenIssuer {
    identities: Arc<dyn IdentityRepository>,
    sessions: SessionStore,
    keys: SigningKeys,
    lifetime: Duration,
}

impl TokenIssuer {
    /// Create an issuer
    ///
    /// `identities` should be the cache-aside decorated repository.
    pub fn new(
        identities: Arc<dyn IdentityRepository>,
        sessions: SessionStore,
        keys: SigningKeys,
        lifetime: Duration,
    ) -> Self {
        Self {
            identities,
            sessions,
            keys,
            lifetime,
        }
    }

    /// Issue a token for `identity_id` at the current time
    pub async fn issue(&self, identity_id: &str) -> Result<IssuedToken, AuthError> {
        self.issue_at(identity_id, Utc::now().timestamp()).await
    }

    /// Issue a token for `identity_id` as of `now` (epoch seconds)
    pub async fn issue_at(&self, identity_id: &str, now: i64) -> Result<IssuedToken, AuthError> {
        let identity = self
            .identities
            .get_by_id(identity_id)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?
            .ok_or(AuthError::IdentityNotFound)?;

        let lifetime = i64::try_from(self.lifetime.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims::for_identity(&identity, now, lifetime);
        let token = self.keys.sign(&claims)?;

        let ttl = Duration::from_secs(claims.remaining_secs(now).max(1));
        if let Err(e) = self.sessions.put(&token, &identity.name, ttl).await {
            warn!(identity_id, error = %e, "Failed to register session marker");
            return Err(AuthError::SessionStoreUnavailable(e.to_string()));
        }

        info!(identity_id, token_version = claims.token_version, "Session token issued");
        Ok(IssuedToken {
            token,
            claims,
            identity,
        })
    }

    /// Configured token lifetime
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }
}
