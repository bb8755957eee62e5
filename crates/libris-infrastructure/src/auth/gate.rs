//! Role gate and admin self-protection

use super::error::AuthError;
use libris_domain::entities::Identity;
use libris_domain::error::{Error, Result};
use libris_domain::repositories::IdentityRepository;
use libris_domain::value_objects::RoleName;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

/// Roles permitted on admin-only operations
pub const ADMIN_ONLY: &[RoleName] = &[RoleName::Admin];

/// Roles permitted on staff operations
pub const STAFF_OR_ADMIN: &[RoleName] = &[RoleName::Admin, RoleName::Staff];

/// Every role
pub const ANY_ROLE: &[RoleName] = &[RoleName::Admin, RoleName::Staff, RoleName::User];

/// Authorizes operations against an identity's current roles
///
/// Roles are always re-read through the identity repository, never taken
/// from the token.
#[derive(Clone)]
pub struct RoleGate {
    identities: Arc<dyn IdentityRepository>,
    deadline: Duration,
}

impl RoleGate {
    /// Create a gate
    ///
    /// `identities` should be the cache-aside decorated repository.
    pub fn new(identities: Arc<dyn IdentityRepository>, deadline: Duration) -> Self {
        Self {
            identities,
            deadline,
        }
    }

    /// Allow `identity_id` if it holds any of `permitted`
    pub async fn authorize(
        &self,
        identity_id: Option<&str>,
        permitted: &'static [RoleName],
    ) -> std::result::Result<Identity, AuthError> {
        self.authorize_by(identity_id, permitted, Instant::now() + self.deadline).await
    }

    /// Like [`Self::authorize`], but the role lookup must finish by `budget_ends`
    ///
    /// Behind a validated token this is [`Principal::budget_ends`], so the
    /// lookup only gets what validation left of the request's deadline.
    ///
    /// [`Principal::budget_ends`]: super::validator::Principal::budget_ends
    pub async fn authorize_by(
        &self,
        identity_id: Option<&str>,
        permitted: &'static [RoleName],
        budget_ends: Instant,
    ) -> std::result::Result<Identity, AuthError> {
        let identity_id = identity_id.ok_or(AuthError::Unauthenticated)?;
        let identity = tokio::time::timeout_at(budget_ends, self.resolve(identity_id))
            .await
            .unwrap_or(Err(AuthError::DeadlineExceeded))?;

        if identity.roles.intersects(permitted) {
            Ok(identity)
        } else {
            warn!(
                identity_id,
                held = ?identity.roles.names(),
                permitted = ?permitted,
                "Role gate denied"
            );
            Err(AuthError::Forbidden("insufficient role".to_string()))
        }
    }

    /// Load an identity with its current roles
    pub async fn resolve(&self, identity_id: &str) -> std::result::Result<Identity, AuthError> {
        self.identities
            .get_by_id(identity_id)
            .await
            .map_err(|e| AuthError::IdentityUnresolved(e.to_string()))?
            .ok_or(AuthError::IdentityNotFound)
    }

    /// Check that `actor_id` may reassign roles of, update or delete `target_id`
    ///
    /// An identity currently holding `admin` can only be modified by itself.
    /// Returns the target snapshot.
    pub async fn ensure_may_modify(&self, actor_id: &str, target_id: &str) -> Result<Identity> {
        let target = self
            .identities
            .get_by_id(target_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user:{target_id}")))?;

        if target.is_admin() && actor_id != target_id {
            warn!(actor_id, target_id, "Refused to modify another admin");
            return Err(Error::forbidden("an admin can only be modified by itself"));
        }
        Ok(target)
    }
}
