//! Shared fixtures: in-memory stores, Moka caches and test doubles

use async_trait::async_trait;
use libris_domain::entities::{Credentials, Identity, IdentityPatch, NewIdentity, Role};
use libris_domain::error::{Error, Result};
use libris_domain::ports::providers::{
    CacheEntryConfig, CacheProvider, CacheStats, PasswordHasher,
};
use libris_domain::repositories::{IdentityRepository, RoleAssignmentRepository, RoleRepository};
use libris_domain::value_objects::RoleName;
use libris_infrastructure::config::{AppConfig, ConfigBuilder};
use libris_infrastructure::{AppContext, CacheProviders, Stores};
use libris_providers::memory::{InMemoryCatalog, InMemoryDirectory};
use std::sync::Arc;
use std::time::Duration;

pub const SECRET: &str = "libris-test-secret-0123456789abcdef";
pub const PASSWORD: &str = "secret123";

/// Reversible "hash" so tests do not pay for Argon2
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        Ok(hash.strip_prefix("plain$") == Some(password))
    }
}

/// Cache whose backend is unreachable
#[derive(Debug)]
pub struct UnreachableCache;

#[async_trait]
impl CacheProvider for UnreachableCache {
    async fn get_json(&self, _key: &str) -> Result<Option<String>> {
        Err(Error::cache("connection refused"))
    }

    async fn set_json(&self, _key: &str, _value: &str, _config: CacheEntryConfig) -> Result<()> {
        Err(Error::cache("connection refused"))
    }

    async fn delete(&self, _key: &str) -> Result<bool> {
        Err(Error::cache("connection refused"))
    }

    async fn exists(&self, _key: &str) -> Result<bool> {
        Err(Error::cache("connection refused"))
    }

    async fn clear(&self) -> Result<()> {
        Err(Error::cache("connection refused"))
    }

    async fn stats(&self) -> Result<CacheStats> {
        Err(Error::cache("connection refused"))
    }

    fn provider_name(&self) -> &str {
        "unreachable"
    }
}

/// Identity store that answers id lookups after `delay`
pub struct SlowIdentities {
    pub inner: Arc<InMemoryDirectory>,
    pub delay: Duration,
}

#[async_trait]
impl IdentityRepository for SlowIdentities {
    async fn get_by_id(&self, id: &str) -> Result<Option<Identity>> {
        tokio::time::sleep(self.delay).await;
        IdentityRepository::get_by_id(self.inner.as_ref(), id).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Identity>> {
        self.inner.get_by_email(email).await
    }

    async fn get_credentials(&self, email: &str) -> Result<Option<Credentials>> {
        self.inner.get_credentials(email).await
    }

    async fn list(&self) -> Result<Vec<Identity>> {
        IdentityRepository::list(self.inner.as_ref()).await
    }

    async fn create(&self, identity: NewIdentity) -> Result<Identity> {
        IdentityRepository::create(self.inner.as_ref(), identity).await
    }

    async fn update(&self, id: &str, patch: IdentityPatch) -> Result<Identity> {
        IdentityRepository::update(self.inner.as_ref(), id, patch).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        IdentityRepository::delete(self.inner.as_ref(), id).await
    }

    async fn increment_token_version(&self, id: &str) -> Result<i64> {
        self.inner.increment_token_version(id).await
    }
}

pub fn test_config() -> AppConfig {
    ConfigBuilder::new().with_jwt_secret(SECRET).build()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Application context over in-memory stores, with handles on the stores
pub struct Fixture {
    pub ctx: AppContext,
    pub directory: Arc<InMemoryDirectory>,
    pub catalog: Arc<InMemoryCatalog>,
    pub entity_cache: Arc<dyn CacheProvider>,
}

impl Fixture {
    /// Bounded Moka for entity snapshots, TTL-only Moka for session markers
    pub fn new() -> Self {
        Self::with_caches(CacheProviders::in_process(10_000))
    }

    pub fn with_caches(caches: CacheProviders) -> Self {
        Self::with_config(test_config(), caches)
    }

    pub fn with_config(config: AppConfig, caches: CacheProviders) -> Self {
        let directory = Arc::new(InMemoryDirectory::new());
        let catalog = Arc::new(InMemoryCatalog::new());
        let entity_cache = Arc::clone(&caches.entities);
        let ctx = AppContext::from_parts(
            config,
            caches,
            Stores::from_memory(Arc::clone(&directory), Arc::clone(&catalog)),
            Arc::new(PlainHasher),
        );
        Self {
            ctx,
            directory,
            catalog,
            entity_cache,
        }
    }

    /// Role `name`, created in the durable store when missing
    pub async fn role(&self, name: RoleName) -> Role {
        let existing = RoleRepository::get_by_name(self.directory.as_ref(), name)
            .await
            .unwrap();
        match existing {
            Some(role) => role,
            None => RoleRepository::create(self.directory.as_ref(), name)
                .await
                .unwrap(),
        }
    }

    /// Identity with password [`PASSWORD`] holding `roles`
    ///
    /// Written straight to the durable store; nothing is cached yet.
    pub async fn identity(&self, name: &str, roles: &[RoleName]) -> Identity {
        let identity = IdentityRepository::create(
            self.directory.as_ref(),
            NewIdentity {
                name: name.to_string(),
                email: email_of(name),
                password_hash: PlainHasher.hash(PASSWORD).unwrap(),
                avatar: None,
            },
        )
        .await
        .unwrap();

        for role in roles {
            let role = self.role(*role).await;
            self.directory.assign(&identity.id, &role.id).await.unwrap();
        }
        IdentityRepository::get_by_id(self.directory.as_ref(), &identity.id)
            .await
            .unwrap()
            .unwrap()
    }

    /// Log `name` in and return the raw token
    pub async fn login(&self, name: &str) -> String {
        self.ctx
            .authenticator()
            .login(&email_of(name), PASSWORD)
            .await
            .unwrap()
            .token
    }
}

pub fn email_of(name: &str) -> String {
    format!("{}@libris.test", name.to_lowercase())
}
