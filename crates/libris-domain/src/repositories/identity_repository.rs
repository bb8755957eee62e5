//! Identity Repository Interface

use crate::entities::{Credentials, Identity, IdentityPatch, NewIdentity};
use crate::error::Result;
use async_trait::async_trait;

/// Repository: identities and their session generation
///
/// Every returned [`Identity`] carries its currently assigned roles.
///
/// # Example
///
/// ```ignore
/// use libris_domain::repositories::IdentityRepository;
///
/// let identity = repo.get_by_id("b1f0...").await?;
/// let version = repo.increment_token_version("b1f0...").await?;
/// ```
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Fetch an identity with its roles
    async fn get_by_id(&self, id: &str) -> Result<Option<Identity>>;

    /// Fetch an identity by login email
    async fn get_by_email(&self, email: &str) -> Result<Option<Identity>>;

    /// Fetch the credential hash for a login email
    ///
    /// Never served from a cache.
    async fn get_credentials(&self, email: &str) -> Result<Option<Credentials>>;

    /// List all identities
    async fn list(&self) -> Result<Vec<Identity>>;

    /// Create an identity with no roles and `token_version` 0
    ///
    /// Fails with `AlreadyExists` when the email is taken.
    async fn create(&self, identity: NewIdentity) -> Result<Identity>;

    /// Apply a partial update
    ///
    /// A patch that replaces the credential also increments
    /// `token_version` in the same write.
    async fn update(&self, id: &str, patch: IdentityPatch) -> Result<Identity>;

    /// Delete an identity and its role assignments
    async fn delete(&self, id: &str) -> Result<()>;

    /// Atomically increment `token_version`, returning the new value
    async fn increment_token_version(&self, id: &str) -> Result<i64>;
}
