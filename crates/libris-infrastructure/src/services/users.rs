//! User (identity) management

use crate::auth::RoleGate;
use crate::auth::password::hash_password;
use libris_domain::entities::{Identity, IdentityPatch, NewIdentity};
use libris_domain::error::{Error, Result};
use libris_domain::ports::providers::PasswordHasher;
use libris_domain::repositories::IdentityRepository;
use std::sync::Arc;
use tracing::info;

/// Fields accepted when an admin creates a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar: Option<String>,
}

/// Partial update; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    /// Plaintext; hashed before it reaches the store
    pub password: Option<String>,
}

/// Admin-facing identity CRUD
#[derive(Clone)]
pub struct UserService {
    identities: Arc<dyn IdentityRepository>,
    hasher: Arc<dyn PasswordHasher>,
    gate: RoleGate,
}

impl UserService {
    /// Create the service over the cached identity repository
    pub fn new(
        identities: Arc<dyn IdentityRepository>,
        hasher: Arc<dyn PasswordHasher>,
        gate: RoleGate,
    ) -> Self {
        Self {
            identities,
            hasher,
            gate,
        }
    }

    pub async fn list(&self) -> Result<Vec<Identity>> {
        self.identities.list().await
    }

    pub async fn get(&self, id: &str) -> Result<Identity> {
        self.identities
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user:{id}")))
    }

    /// Create a user without roles
    pub async fn create(&self, user: NewUser) -> Result<Identity> {
        let password_hash = hash_password(&self.hasher, &user.password).await?;
        let identity = self
            .identities
            .create(NewIdentity {
                name: user.name,
                email: user.email,
                password_hash,
                avatar: user.avatar,
            })
            .await?;
        info!(identity_id = %identity.id, "User created");
        Ok(identity)
    }

    /// Update `id` on behalf of `actor_id`
    ///
    /// A new password bumps `token_version`, which revokes every outstanding
    /// token of that user.
    pub async fn update(&self, actor_id: &str, id: &str, changes: UserChanges) -> Result<Identity> {
        self.gate.ensure_may_modify(actor_id, id).await?;

        let password_hash = match changes.password.as_deref() {
            Some(password) if !password.is_empty() => {
                Some(hash_password(&self.hasher, password).await?)
            }
            _ => None,
        };
        let patch = IdentityPatch {
            name: changes.name,
            email: changes.email,
            avatar: changes.avatar,
            password_hash,
        };
        if patch.is_empty() {
            return self.get(id).await;
        }

        let revokes = patch.changes_credentials();
        let identity = self.identities.update(id, patch).await?;
        info!(actor_id, identity_id = id, revokes, "User updated");
        Ok(identity)
    }

    /// Delete `id` on behalf of `actor_id`
    pub async fn delete(&self, actor_id: &str, id: &str) -> Result<()> {
        self.gate.ensure_may_modify(actor_id, id).await?;
        self.identities.delete(id).await?;
        info!(actor_id, identity_id = id, "User deleted");
        Ok(())
    }
}
