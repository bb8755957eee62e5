//! Role and Role Assignment Repository Interfaces

use crate::entities::Role;
use crate::error::Result;
use crate::value_objects::RoleName;
use async_trait::async_trait;

/// Repository: role records
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Fetch a role by id
    async fn get_by_id(&self, id: &str) -> Result<Option<Role>>;

    /// Fetch a role by name
    async fn get_by_name(&self, name: RoleName) -> Result<Option<Role>>;

    /// List all roles
    async fn list(&self) -> Result<Vec<Role>>;

    /// Create a role; fails with `AlreadyExists` for a duplicate name
    async fn create(&self, name: RoleName) -> Result<Role>;

    /// Rename a role
    async fn update(&self, id: &str, name: RoleName) -> Result<Role>;

    /// Delete a role and every assignment referencing it
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Repository: many-to-many relation between identities and roles
#[async_trait]
pub trait RoleAssignmentRepository: Send + Sync {
    /// Assign a role; fails with `AlreadyExists` when already held
    async fn assign(&self, identity_id: &str, role_id: &str) -> Result<()>;

    /// Remove an assignment, returning whether one existed
    async fn remove(&self, identity_id: &str, role_id: &str) -> Result<bool>;

    /// Roles currently assigned to an identity
    async fn roles_of(&self, identity_id: &str) -> Result<Vec<Role>>;

    /// Identities currently holding a role
    async fn holders(&self, role_id: &str) -> Result<Vec<String>>;
}
