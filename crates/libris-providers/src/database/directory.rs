//! PostgreSQL identity, role and role-assignment repositories

use super::{DatabasePool, map_pg_error, timestamp};
use async_trait::async_trait;
use libris_domain::entities::{Credentials, Identity, IdentityPatch, NewIdentity, Role};
use libris_domain::error::{Error, Result};
use libris_domain::repositories::{IdentityRepository, RoleAssignmentRepository, RoleRepository};
use libris_domain::value_objects::{RoleName, RoleSet};
use r2d2_postgres::postgres::error::SqlState;
use r2d2_postgres::postgres::{GenericClient, Row};
use uuid::Uuid;

const IDENTITY_SELECT: &str = "
    SELECT u.id, u.name, u.email, u.avatar, u.token_version,
           EXTRACT(EPOCH FROM u.created_at)::BIGINT AS created_at,
           EXTRACT(EPOCH FROM u.updated_at)::BIGINT AS updated_at,
           COALESCE(string_agg(r.name, ', ' ORDER BY r.name), '') AS roles
    FROM users u
    LEFT JOIN role_user ru ON ru.user_id = u.id
    LEFT JOIN roles r ON r.id = ru.role_id";

const ROLE_SELECT: &str = "
    SELECT r.id, r.name,
           EXTRACT(EPOCH FROM r.created_at)::BIGINT AS created_at,
           EXTRACT(EPOCH FROM r.updated_at)::BIGINT AS updated_at
    FROM roles r";

fn identity_from_row(row: &Row) -> Identity {
    let roles: String = row.get("roles");
    Identity {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        avatar: row.get("avatar"),
        token_version: row.get("token_version"),
        roles: RoleSet::parse_joined(&roles),
        created_at: timestamp(row.get("created_at")),
        updated_at: timestamp(row.get("updated_at")),
    }
}

fn role_from_row(row: &Row) -> Result<Role> {
    let name: String = row.get("name");
    Ok(Role {
        id: row.get("id"),
        name: name.parse()?,
        created_at: timestamp(row.get("created_at")),
        updated_at: timestamp(row.get("updated_at")),
    })
}

fn load_identity<C: GenericClient>(client: &mut C, id: &str) -> Result<Option<Identity>> {
    let sql = format!("{IDENTITY_SELECT} WHERE u.id = $1 GROUP BY u.id");
    client
        .query_opt(sql.as_str(), &[&id])
        .map(|row| row.as_ref().map(identity_from_row))
        .map_err(|e| map_pg_error("Failed to load user", e))
}

fn load_role<C: GenericClient>(client: &mut C, id: &str) -> Result<Option<Role>> {
    let sql = format!("{ROLE_SELECT} WHERE r.id = $1");
    client
        .query_opt(sql.as_str(), &[&id])
        .map_err(|e| map_pg_error("Failed to load role", e))?
        .as_ref()
        .map(role_from_row)
        .transpose()
}

/// Identity and role store backed by PostgreSQL
#[derive(Clone)]
pub struct PostgresDirectory {
    pool: DatabasePool,
}

impl PostgresDirectory {
    /// Create a directory over an existing pool
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl std::fmt::Debug for PostgresDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresDirectory")
            .field("pool", &self.pool.stats())
            .finish()
    }
}

#[async_trait]
impl IdentityRepository for PostgresDirectory {
    async fn get_by_id(&self, id: &str) -> Result<Option<Identity>> {
        let id = id.to_string();
        self.pool.run(move |client| load_identity(client, &id)).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Identity>> {
        let email = email.to_string();
        self.pool
            .run(move |client| {
                let sql = format!("{IDENTITY_SELECT} WHERE u.email = $1 GROUP BY u.id");
                client
                    .query_opt(sql.as_str(), &[&email])
                    .map(|row| row.as_ref().map(identity_from_row))
                    .map_err(|e| map_pg_error("Failed to load user by email", e))
            })
            .await
    }

    async fn get_credentials(&self, email: &str) -> Result<Option<Credentials>> {
        let email = email.to_string();
        self.pool
            .run(move |client| {
                client
                    .query_opt("SELECT id, password FROM users WHERE email = $1", &[&email])
                    .map(|row| {
                        row.map(|row| Credentials {
                            identity_id: row.get("id"),
                            password_hash: row.get("password"),
                        })
                    })
                    .map_err(|e| map_pg_error("Failed to load credentials", e))
            })
            .await
    }

    async fn list(&self) -> Result<Vec<Identity>> {
        self.pool
            .run(|client| {
                let sql = format!("{IDENTITY_SELECT} GROUP BY u.id ORDER BY u.created_at");
                client
                    .query(sql.as_str(), &[])
                    .map(|rows| rows.iter().map(identity_from_row).collect())
                    .map_err(|e| map_pg_error("Failed to list users", e))
            })
            .await
    }

    async fn create(&self, identity: NewIdentity) -> Result<Identity> {
        let id = Uuid::new_v4().to_string();
        self.pool
            .run(move |client| {
                client
                    .execute(
                        "INSERT INTO users (id, name, email, password, avatar, token_version)
                         VALUES ($1, $2, $3, $4, $5, 0)",
                        &[
                            &id,
                            &identity.name,
                            &identity.email,
                            &identity.password_hash,
                            &identity.avatar,
                        ],
                    )
                    .map_err(|e| map_pg_error("Failed to create user", e))?;
                load_identity(client, &id)?
                    .ok_or_else(|| Error::internal("Created user vanished before read-back"))
            })
            .await
    }

    async fn update(&self, id: &str, patch: IdentityPatch) -> Result<Identity> {
        let id = id.to_string();
        self.pool
            .run(move |client| {
                let changed = client
                    .execute(
                        "UPDATE users SET
                             name = COALESCE($2, name),
                             email = COALESCE($3, email),
                             avatar = COALESCE($4, avatar),
                             password = COALESCE($5, password),
                             token_version = token_version
                                 + CASE WHEN $5::TEXT IS NULL THEN 0 ELSE 1 END,
                             updated_at = NOW()
                         WHERE id = $1",
                        &[
                            &id,
                            &patch.name,
                            &patch.email,
                            &patch.avatar,
                            &patch.password_hash,
                        ],
                    )
                    .map_err(|e| map_pg_error("Failed to update user", e))?;
                if changed == 0 {
                    return Err(Error::not_found(format!("user:{id}")));
                }
                load_identity(client, &id)?.ok_or_else(|| Error::not_found(format!("user:{id}")))
            })
            .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.pool
            .run(move |client| {
                let removed = client
                    .execute("DELETE FROM users WHERE id = $1", &[&id])
                    .map_err(|e| map_pg_error("Failed to delete user", e))?;
                if removed == 0 {
                    return Err(Error::not_found(format!("user:{id}")));
                }
                Ok(())
            })
            .await
    }

    async fn increment_token_version(&self, id: &str) -> Result<i64> {
        let id = id.to_string();
        self.pool
            .run(move |client| {
                client
                    .query_opt(
                        "UPDATE users SET token_version = token_version + 1, updated_at = NOW()
                         WHERE id = $1 RETURNING token_version",
                        &[&id],
                    )
                    .map_err(|e| map_pg_error("Failed to bump token version", e))?
                    .map(|row| row.get::<_, i64>(0))
                    .ok_or_else(|| Error::not_found(format!("user:{id}")))
            })
            .await
    }
}

#[async_trait]
impl RoleRepository for PostgresDirectory {
    async fn get_by_id(&self, id: &str) -> Result<Option<Role>> {
        let id = id.to_string();
        self.pool.run(move |client| load_role(client, &id)).await
    }

    async fn get_by_name(&self, name: RoleName) -> Result<Option<Role>> {
        self.pool
            .run(move |client| {
                let sql = format!("{ROLE_SELECT} WHERE r.name = $1");
                client
                    .query_opt(sql.as_str(), &[&name.as_str()])
                    .map_err(|e| map_pg_error("Failed to load role by name", e))?
                    .as_ref()
                    .map(role_from_row)
                    .transpose()
            })
            .await
    }

    async fn list(&self) -> Result<Vec<Role>> {
        self.pool
            .run(|client| {
                let sql = format!("{ROLE_SELECT} ORDER BY r.name");
                client
                    .query(sql.as_str(), &[])
                    .map_err(|e| map_pg_error("Failed to list roles", e))?
                    .iter()
                    .map(role_from_row)
                    .collect()
            })
            .await
    }

    async fn create(&self, name: RoleName) -> Result<Role> {
        let id = Uuid::new_v4().to_string();
        self.pool
            .run(move |client| {
                client
                    .execute(
                        "INSERT INTO roles (id, name) VALUES ($1, $2)",
                        &[&id, &name.as_str()],
                    )
                    .map_err(|e| map_pg_error("Failed to create role", e))?;
                load_role(client, &id)?
                    .ok_or_else(|| Error::internal("Created role vanished before read-back"))
            })
            .await
    }

    async fn update(&self, id: &str, name: RoleName) -> Result<Role> {
        let id = id.to_string();
        self.pool
            .run(move |client| {
                let changed = client
                    .execute(
                        "UPDATE roles SET name = $2, updated_at = NOW() WHERE id = $1",
                        &[&id, &name.as_str()],
                    )
                    .map_err(|e| map_pg_error("Failed to update role", e))?;
                if changed == 0 {
                    return Err(Error::not_found(format!("role:{id}")));
                }
                load_role(client, &id)?.ok_or_else(|| Error::not_found(format!("role:{id}")))
            })
            .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.pool
            .run(move |client| {
                let removed = client
                    .execute("DELETE FROM roles WHERE id = $1", &[&id])
                    .map_err(|e| map_pg_error("Failed to delete role", e))?;
                if removed == 0 {
                    return Err(Error::not_found(format!("role:{id}")));
                }
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl RoleAssignmentRepository for PostgresDirectory {
    async fn assign(&self, identity_id: &str, role_id: &str) -> Result<()> {
        let identity_id = identity_id.to_string();
        let role_id = role_id.to_string();
        self.pool
            .run(move |client| {
                client
                    .execute(
                        "INSERT INTO role_user (user_id, role_id) VALUES ($1, $2)",
                        &[&identity_id, &role_id],
                    )
                    .map(|_| ())
                    .map_err(|e| {
                        if e.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION) {
                            Error::not_found(format!("user:{identity_id} or role:{role_id}"))
                        } else {
                            map_pg_error("Failed to assign role", e)
                        }
                    })
            })
            .await
    }

    async fn remove(&self, identity_id: &str, role_id: &str) -> Result<bool> {
        let identity_id = identity_id.to_string();
        let role_id = role_id.to_string();
        self.pool
            .run(move |client| {
                client
                    .execute(
                        "DELETE FROM role_user WHERE user_id = $1 AND role_id = $2",
                        &[&identity_id, &role_id],
                    )
                    .map(|removed| removed > 0)
                    .map_err(|e| map_pg_error("Failed to remove role", e))
            })
            .await
    }

    async fn roles_of(&self, identity_id: &str) -> Result<Vec<Role>> {
        let identity_id = identity_id.to_string();
        self.pool
            .run(move |client| {
                let sql = format!(
                    "{ROLE_SELECT} JOIN role_user ru ON ru.role_id = r.id
                     WHERE ru.user_id = $1 ORDER BY r.name"
                );
                client
                    .query(sql.as_str(), &[&identity_id])
                    .map_err(|e| map_pg_error("Failed to load user roles", e))?
                    .iter()
                    .map(role_from_row)
                    .collect()
            })
            .await
    }

    async fn holders(&self, role_id: &str) -> Result<Vec<String>> {
        let role_id = role_id.to_string();
        self.pool
            .run(move |client| {
                client
                    .query(
                        "SELECT user_id FROM role_user WHERE role_id = $1",
                        &[&role_id],
                    )
                    .map(|rows| rows.iter().map(|row| row.get(0)).collect())
                    .map_err(|e| map_pg_error("Failed to load role holders", e))
            })
            .await
    }
}
