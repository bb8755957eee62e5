//! Identity (user account) entity
//!
//! [`Identity`] is the snapshot that flows through caches and responses. It
//! never carries the credential hash; that lives in [`Credentials`], which
//! repositories only return from an explicit, uncached lookup.

use crate::value_objects::{RoleName, RoleSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated principal together with its current roles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Login email, unique across identities
    pub email: String,
    /// Avatar reference, if one was uploaded
    pub avatar: Option<String>,
    /// Session generation; bumping it revokes every outstanding token
    pub token_version: i64,
    /// Role names currently assigned
    pub roles: RoleSet,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Whether the identity currently holds `role`
    pub fn has_role(&self, role: RoleName) -> bool {
        self.roles.contains(role)
    }

    /// Whether the identity currently holds the admin role
    pub fn is_admin(&self) -> bool {
        self.has_role(RoleName::Admin)
    }
}

/// Credential material for a login check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Identity the hash belongs to
    pub identity_id: String,
    /// PHC-formatted password hash
    pub password_hash: String,
}

/// Data required to create an identity
#[derive(Debug, Clone)]
pub struct NewIdentity {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Already-hashed password
    pub password_hash: String,
    /// Avatar reference
    pub avatar: Option<String>,
}

/// Partial update of an identity
///
/// Setting `password_hash` also bumps `token_version` in the same write.
#[derive(Debug, Clone, Default)]
pub struct IdentityPatch {
    /// New display name
    pub name: Option<String>,
    /// New login email
    pub email: Option<String>,
    /// New avatar reference
    pub avatar: Option<String>,
    /// New password hash
    pub password_hash: Option<String>,
}

impl IdentityPatch {
    /// Whether the patch replaces the credential
    pub fn changes_credentials(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Whether the patch has nothing to apply
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.avatar.is_none()
            && self.password_hash.is_none()
    }
}
