//! In-memory identity, role and role-assignment store

use super::{read_lock, write_lock};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libris_domain::entities::{Credentials, Identity, IdentityPatch, NewIdentity, Role};
use libris_domain::error::{Error, Result};
use libris_domain::repositories::{
    IdentityRepository, RoleAssignmentRepository, RoleRepository,
};
use libris_domain::value_objects::{RoleName, RoleSet};
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredIdentity {
    id: String,
    name: String,
    email: String,
    avatar: Option<String>,
    password_hash: String,
    token_version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    identities: HashMap<String, StoredIdentity>,
    roles: HashMap<String, Role>,
    /// (identity id, role id)
    assignments: BTreeSet<(String, String)>,
}

impl DirectoryState {
    fn roles_of(&self, identity_id: &str) -> Vec<Role> {
        self.assignments
            .iter()
            .filter(|(holder, _)| holder == identity_id)
            .filter_map(|(_, role_id)| self.roles.get(role_id).cloned())
            .collect()
    }

    fn snapshot(&self, stored: &StoredIdentity) -> Identity {
        let roles: RoleSet = self
            .roles_of(&stored.id)
            .into_iter()
            .map(|role| role.name)
            .collect();
        Identity {
            id: stored.id.clone(),
            name: stored.name.clone(),
            email: stored.email.clone(),
            avatar: stored.avatar.clone(),
            token_version: stored.token_version,
            roles,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }

    fn email_taken_by_other(&self, email: &str, except: Option<&str>) -> bool {
        self.identities
            .values()
            .any(|i| i.email == email && Some(i.id.as_str()) != except)
    }

    fn role_name_taken_by_other(&self, name: RoleName, except: Option<&str>) -> bool {
        self.roles
            .values()
            .any(|r| r.name == name && Some(r.id.as_str()) != except)
    }
}

/// In-memory implementation of the identity, role and assignment repositories
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    state: RwLock<DirectoryState>,
    queries: AtomicU64,
}

impl InMemoryDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of repository calls served so far
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityRepository for InMemoryDirectory {
    async fn get_by_id(&self, id: &str) -> Result<Option<Identity>> {
        self.count();
        let state = read_lock(&self.state)?;
        Ok(state.identities.get(id).map(|s| state.snapshot(s)))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Identity>> {
        self.count();
        let state = read_lock(&self.state)?;
        Ok(state
            .identities
            .values()
            .find(|s| s.email == email)
            .map(|s| state.snapshot(s)))
    }

    async fn get_credentials(&self, email: &str) -> Result<Option<Credentials>> {
        self.count();
        let state = read_lock(&self.state)?;
        Ok(state
            .identities
            .values()
            .find(|s| s.email == email)
            .map(|s| Credentials {
                identity_id: s.id.clone(),
                password_hash: s.password_hash.clone(),
            }))
    }

    async fn list(&self) -> Result<Vec<Identity>> {
        self.count();
        let state = read_lock(&self.state)?;
        let mut identities: Vec<Identity> = state
            .identities
            .values()
            .map(|s| state.snapshot(s))
            .collect();
        identities.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(identities)
    }

    async fn create(&self, identity: NewIdentity) -> Result<Identity> {
        self.count();
        let mut state = write_lock(&self.state)?;
        if state.email_taken_by_other(&identity.email, None) {
            return Err(Error::already_exists(format!(
                "user with email {} already exists",
                identity.email
            )));
        }
        let now = Utc::now();
        let stored = StoredIdentity {
            id: Uuid::new_v4().to_string(),
            name: identity.name,
            email: identity.email,
            avatar: identity.avatar,
            password_hash: identity.password_hash,
            token_version: 0,
            created_at: now,
            updated_at: now,
        };
        let snapshot = state.snapshot(&stored);
        state.identities.insert(stored.id.clone(), stored);
        Ok(snapshot)
    }

    async fn update(&self, id: &str, patch: IdentityPatch) -> Result<Identity> {
        self.count();
        let mut state = write_lock(&self.state)?;
        if let Some(email) = &patch.email {
            if state.email_taken_by_other(email, Some(id)) {
                return Err(Error::already_exists(format!(
                    "user with email {email} already exists"
                )));
            }
        }
        let stored = state
            .identities
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("user:{id}")))?;

        let changes_credentials = patch.changes_credentials();
        if let Some(name) = patch.name {
            stored.name = name;
        }
        if let Some(email) = patch.email {
            stored.email = email;
        }
        if let Some(avatar) = patch.avatar {
            stored.avatar = Some(avatar);
        }
        if let Some(hash) = patch.password_hash {
            stored.password_hash = hash;
        }
        if changes_credentials {
            stored.token_version += 1;
        }
        stored.updated_at = Utc::now();

        let stored = stored.clone();
        Ok(state.snapshot(&stored))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.count();
        let mut state = write_lock(&self.state)?;
        if state.identities.remove(id).is_none() {
            return Err(Error::not_found(format!("user:{id}")));
        }
        state.assignments.retain(|(holder, _)| holder != id);
        Ok(())
    }

    async fn increment_token_version(&self, id: &str) -> Result<i64> {
        self.count();
        let mut state = write_lock(&self.state)?;
        let stored = state
            .identities
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("user:{id}")))?;
        stored.token_version += 1;
        Ok(stored.token_version)
    }
}

#[async_trait]
impl RoleRepository for InMemoryDirectory {
    async fn get_by_id(&self, id: &str) -> Result<Option<Role>> {
        self.count();
        Ok(read_lock(&self.state)?.roles.get(id).cloned())
    }

    async fn get_by_name(&self, name: RoleName) -> Result<Option<Role>> {
        self.count();
        Ok(read_lock(&self.state)?
            .roles
            .values()
            .find(|r| r.name == name)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Role>> {
        self.count();
        let mut roles: Vec<Role> = read_lock(&self.state)?.roles.values().cloned().collect();
        roles.sort_by_key(|r| r.name);
        Ok(roles)
    }

    async fn create(&self, name: RoleName) -> Result<Role> {
        self.count();
        let mut state = write_lock(&self.state)?;
        if state.role_name_taken_by_other(name, None) {
            return Err(Error::already_exists(format!("role {name} already exists")));
        }
        let now = Utc::now();
        let role = Role {
            id: Uuid::new_v4().to_string(),
            name,
            created_at: now,
            updated_at: now,
        };
        state.roles.insert(role.id.clone(), role.clone());
        Ok(role)
    }

    async fn update(&self, id: &str, name: RoleName) -> Result<Role> {
        self.count();
        let mut state = write_lock(&self.state)?;
        if state.role_name_taken_by_other(name, Some(id)) {
            return Err(Error::already_exists(format!("role {name} already exists")));
        }
        let role = state
            .roles
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("role:{id}")))?;
        role.name = name;
        role.updated_at = Utc::now();
        Ok(role.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.count();
        let mut state = write_lock(&self.state)?;
        if state.roles.remove(id).is_none() {
            return Err(Error::not_found(format!("role:{id}")));
        }
        state.assignments.retain(|(_, role_id)| role_id != id);
        Ok(())
    }
}

#[async_trait]
impl RoleAssignmentRepository for InMemoryDirectory {
    async fn assign(&self, identity_id: &str, role_id: &str) -> Result<()> {
        self.count();
        let mut state = write_lock(&self.state)?;
        if !state.identities.contains_key(identity_id) {
            return Err(Error::not_found(format!("user:{identity_id}")));
        }
        if !state.roles.contains_key(role_id) {
            return Err(Error::not_found(format!("role:{role_id}")));
        }
        if !state
            .assignments
            .insert((identity_id.to_string(), role_id.to_string()))
        {
            return Err(Error::already_exists("role already assigned to user"));
        }
        Ok(())
    }

    async fn remove(&self, identity_id: &str, role_id: &str) -> Result<bool> {
        self.count();
        let mut state = write_lock(&self.state)?;
        Ok(state
            .assignments
            .remove(&(identity_id.to_string(), role_id.to_string())))
    }

    async fn roles_of(&self, identity_id: &str) -> Result<Vec<Role>> {
        self.count();
        Ok(read_lock(&self.state)?.roles_of(identity_id))
    }

    async fn holders(&self, role_id: &str) -> Result<Vec<String>> {
        self.count();
        Ok(read_lock(&self.state)?
            .assignments
            .iter()
            .filter(|(_, held)| held == role_id)
            .map(|(holder, _)| holder.clone())
            .collect())
    }
}
