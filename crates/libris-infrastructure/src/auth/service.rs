//! Login and registration

use super::error::AuthError;
use super::issuer::{IssuedToken, TokenIssuer};
use super::password::{hash_password, verify_password};
use libris_domain::entities::{Identity, NewIdentity};
use libris_domain::error::Result;
use libris_domain::ports::providers::PasswordHasher;
use libris_domain::repositories::IdentityRepository;
use std::sync::Arc;
use tracing::{info, warn};

/// Credential check followed by token issuance
pub struct Authenticator {
    identities: Arc<dyn IdentityRepository>,
    hasher: Arc<dyn PasswordHasher>,
    issuer: Arc<TokenIssuer>,
}

impl Authenticator {
    /// Create an authenticator
    pub fn new(
        identities: Arc<dyn IdentityRepository>,
        hasher: Arc<dyn PasswordHasher>,
        issuer: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            identities,
            hasher,
            issuer,
        }
    }

    /// Check credentials and issue a session token
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> std::result::Result<IssuedToken, AuthError> {
        let credentials = self
            .identities
            .get_credentials(email)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        let Some(credentials) = credentials else {
            warn!(cause = "unknown_email", "Login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let verified = verify_password(&self.hasher, password, &credentials.password_hash)
            .await
            .unwrap_or_else(|e| {
                warn!(identity_id = %credentials.identity_id, error = %e, "Stored hash unreadable");
                false
            });
        if !verified {
            warn!(identity_id = %credentials.identity_id, cause = "wrong_password", "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        self.issuer.issue(&credentials.identity_id).await
    }

    /// Create an identity with no role assigned
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Identity> {
        let password_hash = hash_password(&self.hasher, password).await?;
        let identity = self
            .identities
            .create(NewIdentity {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                avatar: None,
            })
            .await?;
        info!(identity_id = %identity.id, "Identity registered");
        Ok(identity)
    }
}
