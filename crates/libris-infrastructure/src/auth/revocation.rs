//! Session revocation
//!
//! Logout deletes the marker of the presented token only. Logging out
//! everywhere bumps the identity's durable `token_version`, which rejects
//! every earlier token through the version comparison whether or not their
//! markers survive.

use super::error::AuthError;
use crate::cache::SessionStore;
use libris_domain::repositories::IdentityRepository;
use std::sync::Arc;
use tracing::{info, warn};

/// Per-token and per-identity revocation
pub struct SessionRevocation {
    identities: Arc<dyn IdentityRepository>,
    sessions: SessionStore,
}

impl SessionRevocation {
    /// Create a revocation service
    ///
    /// `identities` must be the cache-aside decorated repository so the
    /// identity snapshot is invalidated after the version bump commits.
    pub fn new(identities: Arc<dyn IdentityRepository>, sessions: SessionStore) -> Self {
        Self {
            identities,
            sessions,
        }
    }

    /// Revoke exactly `token`
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        match self.sessions.remove(token).await {
            Ok(removed) => {
                info!(removed, "Session logged out");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to delete session marker");
                Err(AuthError::SessionStoreUnavailable(e.to_string()))
            }
        }
    }

    /// Revoke every token of `identity_id`, returning the new version
    ///
    /// `presented` is the token used for this request; its marker is
    /// removed as well, on a best-effort basis.
    pub async fn revoke_all(
        &self,
        identity_id: &str,
        presented: Option<&str>,
    ) -> Result<i64, AuthError> {
        let version = self
            .identities
            .increment_token_version(identity_id)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        info!(identity_id, token_version = version, "All sessions revoked");

        if let Some(token) = presented {
            if let Err(e) = self.sessions.remove(token).await {
                warn!(identity_id, error = %e, "Marker cleanup after global revoke failed");
            }
        }
        Ok(version)
    }
}
