//! Roles and role assignment

use crate::auth::RoleGate;
use libris_domain::entities::Role;
use libris_domain::error::{Error, Result};
use libris_domain::repositories::{RoleAssignmentRepository, RoleRepository};
use libris_domain::value_objects::RoleName;
use std::sync::Arc;
use tracing::{info, warn};

/// Admin-facing role and assignment management
///
/// Renaming or deleting the `admin` role strips it from every holder, so it
/// is refused while anyone other than the actor holds it.
#[derive(Clone)]
pub struct RoleService {
    roles: Arc<dyn RoleRepository>,
    assignments: Arc<dyn RoleAssignmentRepository>,
    gate: RoleGate,
}

impl RoleService {
    /// Create the service over the cached role and assignment repositories
    pub fn new(
        roles: Arc<dyn RoleRepository>,
        assignments: Arc<dyn RoleAssignmentRepository>,
        gate: RoleGate,
    ) -> Self {
        Self {
            roles,
            assignments,
            gate,
        }
    }

    pub async fn list(&self) -> Result<Vec<Role>> {
        self.roles.list().await
    }

    pub async fn get(&self, id: &str) -> Result<Role> {
        self.roles
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("role:{id}")))
    }

    pub async fn create(&self, name: RoleName) -> Result<Role> {
        let role = self.roles.create(name).await?;
        info!(role_id = %role.id, role = %name, "Role created");
        Ok(role)
    }

    /// Rename `id` on behalf of `actor_id`
    pub async fn rename(&self, actor_id: &str, id: &str, name: RoleName) -> Result<Role> {
        let current = self.get(id).await?;
        if current.name == name {
            return Ok(current);
        }
        self.ensure_no_foreign_admins(actor_id, &current).await?;
        let role = self.roles.update(id, name).await?;
        info!(actor_id, role_id = id, from = %current.name, to = %name, "Role renamed");
        Ok(role)
    }

    /// Delete `id` on behalf of `actor_id`
    pub async fn delete(&self, actor_id: &str, id: &str) -> Result<()> {
        let current = self.get(id).await?;
        self.ensure_no_foreign_admins(actor_id, &current).await?;
        self.roles.delete(id).await?;
        info!(actor_id, role_id = id, role = %current.name, "Role deleted");
        Ok(())
    }

    /// Roles currently held by `identity_id`
    pub async fn roles_of(&self, identity_id: &str) -> Result<Vec<Role>> {
        self.gate.resolve(identity_id).await.map_err(Error::from)?;
        self.assignments.roles_of(identity_id).await
    }

    /// Grant `role_id` to `identity_id`
    pub async fn assign(&self, actor_id: &str, identity_id: &str, role_id: &str) -> Result<()> {
        self.gate.ensure_may_modify(actor_id, identity_id).await?;
        let role = self.get(role_id).await?;
        self.assignments.assign(identity_id, role_id).await?;
        info!(actor_id, identity_id, role = %role.name, "Role assigned");
        Ok(())
    }

    /// Revoke `role_id` from `identity_id`
    pub async fn remove(&self, actor_id: &str, identity_id: &str, role_id: &str) -> Result<()> {
        self.gate.ensure_may_modify(actor_id, identity_id).await?;
        if !self.assignments.remove(identity_id, role_id).await? {
            return Err(Error::not_found(format!("role_user:{identity_id}:{role_id}")));
        }
        info!(actor_id, identity_id, role_id, "Role removed");
        Ok(())
    }

    async fn ensure_no_foreign_admins(&self, actor_id: &str, role: &Role) -> Result<()> {
        if role.name != RoleName::Admin {
            return Ok(());
        }
        let holders = self.assignments.holders(&role.id).await?;
        if holders.iter().any(|holder| holder != actor_id) {
            warn!(actor_id, role_id = %role.id, "Refused to change admin role held by others");
            return Err(Error::forbidden(
                "the admin role is held by other identities",
            ));
        }
        Ok(())
    }
}
