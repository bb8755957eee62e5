//! Composition root
//!
//! Builds every component once from [`AppConfig`] and hands out shared
//! handles. Nothing here is swapped at runtime.
//!
//! ```text
//! AppConfig -> cache providers -> durable stores -> cached decorators
//!                                                       |
//!             issuer / validator / gate / revocation <--+--> services
//! ```

use crate::auth::{
    Authenticator, RoleGate, SessionRevocation, SigningKeys, TokenIssuer, TokenValidator,
};
use crate::cache::{
    CacheAside, CachedBookRepository, CachedCirculationRepository, CachedIdentityRepository,
    CachedMemberRepository, CachedRoleAssignmentRepository, CachedRoleRepository, SessionStore,
};
use crate::config::{AppConfig, CacheConfig, CacheProviderKind};
use crate::health::HealthChecker;
use crate::services::{
    BookService, CirculationService, MemberService, NewUser, RoleService, UserService,
};
use libris_domain::error::Result;
use libris_domain::ports::providers::{CacheProvider, PasswordHasher};
use libris_domain::repositories::{
    BookRepository, CirculationRepository, IdentityRepository, MemberRepository,
    RoleAssignmentRepository, RoleRepository,
};
use libris_domain::value_objects::RoleName;
use libris_providers::cache::{MokaCacheProvider, NullCacheProvider, RedisCacheProvider};
use libris_providers::crypto::Argon2PasswordHasher;
use libris_providers::database::{DatabasePool, PostgresCatalog, PostgresDirectory};
use libris_providers::memory::{InMemoryCatalog, InMemoryDirectory};
use std::sync::Arc;
use tracing::{info, warn};

/// Durable repositories, before any caching
#[derive(Clone)]
pub struct Stores {
    pub identities: Arc<dyn IdentityRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub assignments: Arc<dyn RoleAssignmentRepository>,
    pub members: Arc<dyn MemberRepository>,
    pub books: Arc<dyn BookRepository>,
    pub circulations: Arc<dyn CirculationRepository>,
    /// Present when backed by PostgreSQL
    pub database: Option<DatabasePool>,
}

impl Stores {
    /// Process-local stores
    pub fn in_memory() -> Self {
        Self::from_memory(Arc::new(InMemoryDirectory::new()), Arc::new(InMemoryCatalog::new()))
    }

    /// Process-local stores over existing instances
    ///
    /// Tests keep their own handles to read `query_count`.
    pub fn from_memory(directory: Arc<InMemoryDirectory>, catalog: Arc<InMemoryCatalog>) -> Self {
        Self {
            identities: directory.clone(),
            roles: directory.clone(),
            assignments: directory,
            members: catalog.clone(),
            books: catalog.clone(),
            circulations: catalog,
            database: None,
        }
    }

    /// PostgreSQL stores sharing one pool
    pub fn postgres(pool: DatabasePool) -> Self {
        let directory = Arc::new(PostgresDirectory::new(pool.clone()));
        let catalog = Arc::new(PostgresCatalog::new(pool.clone()));
        Self {
            identities: directory.clone(),
            roles: directory.clone(),
            assignments: directory,
            members: catalog.clone(),
            books: catalog.clone(),
            circulations: catalog,
            database: Some(pool),
        }
    }
}

/// Cache providers for the two disciplines
///
/// Entity snapshots fail open; session markers fail closed. Markers must
/// never be evicted before their TTL, so an in-process marker store is
/// always separate from a size-bounded entity cache. Redis may serve both
/// as long as it runs with the default `noeviction` memory policy.
#[derive(Clone)]
pub struct CacheProviders {
    pub entities: Arc<dyn CacheProvider>,
    pub sessions: Arc<dyn CacheProvider>,
}

impl CacheProviders {
    /// Bounded in-process entity cache next to an unbounded marker store
    pub fn in_process(max_entries: u64) -> Self {
        Self {
            entities: Arc::new(MokaCacheProvider::with_capacity(max_entries)),
            sessions: Arc::new(MokaCacheProvider::ttl_only()),
        }
    }

    /// One provider for both; it must not evict live entries
    pub fn shared(provider: Arc<dyn CacheProvider>) -> Self {
        Self {
            entities: Arc::clone(&provider),
            sessions: provider,
        }
    }
}

/// Build the configured cache providers
///
/// Session markers need a real store, so the `null` provider only disables
/// entity caching and markers fall back to an in-process cache.
pub fn build_cache_providers(config: &CacheConfig) -> Result<CacheProviders> {
    let providers = match config.provider {
        CacheProviderKind::Moka => CacheProviders::in_process(config.max_entries),
        CacheProviderKind::Redis => {
            let url = config.redis_url.as_deref().unwrap_or_default();
            let redis = RedisCacheProvider::new(url)?.with_command_timeout(config.operation_timeout());
            CacheProviders::shared(Arc::new(redis))
        }
        CacheProviderKind::Null => {
            warn!("Entity cache disabled; session markers kept in process memory");
            CacheProviders {
                entities: Arc::new(NullCacheProvider::new()),
                sessions: Arc::new(MokaCacheProvider::ttl_only()),
            }
        }
    };
    Ok(providers)
}

/// Open the durable stores
pub async fn build_stores(config: &AppConfig) -> Result<Stores> {
    if !config.database.enabled {
        warn!("Database disabled; using in-memory stores");
        return Ok(Stores::in_memory());
    }

    let pool = DatabasePool::new(&config.database)?;
    if config.database.apply_schema {
        pool.apply_schema().await?;
        info!("Database schema applied");
    }
    Ok(Stores::postgres(pool))
}

/// Every long-lived component of the application
pub struct AppContext {
    /// Application configuration
    pub config: Arc<AppConfig>,

    identities: Arc<dyn IdentityRepository>,
    roles: Arc<dyn RoleRepository>,
    assignments: Arc<dyn RoleAssignmentRepository>,

    issuer: Arc<TokenIssuer>,
    validator: Arc<TokenValidator>,
    gate: RoleGate,
    revocation: Arc<SessionRevocation>,
    authenticator: Arc<Authenticator>,

    users: UserService,
    role_service: RoleService,
    members: MemberService,
    books: BookService,
    circulations: CirculationService,
    health: HealthChecker,
}

impl AppContext {
    /// Wire the components over already-built providers and stores
    pub fn from_parts(
        config: AppConfig,
        caches: CacheProviders,
        stores: Stores,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        let config = Arc::new(config);
        let aside = CacheAside::new(Arc::clone(&caches.entities), &config.cache);
        let sessions = SessionStore::new(
            Arc::clone(&caches.sessions),
            config.cache.operation_timeout(),
        );

        let assignments: Arc<dyn RoleAssignmentRepository> = Arc::new(
            CachedRoleAssignmentRepository::new(stores.assignments.clone(), aside.clone()),
        );
        let identities: Arc<dyn IdentityRepository> = Arc::new(CachedIdentityRepository::new(
            stores.identities,
            aside.clone(),
        ));
        let roles: Arc<dyn RoleRepository> = Arc::new(CachedRoleRepository::new(
            stores.roles,
            stores.assignments,
            aside.clone(),
        ));
        let members: Arc<dyn MemberRepository> =
            Arc::new(CachedMemberRepository::new(stores.members, aside.clone()));
        let books: Arc<dyn BookRepository> =
            Arc::new(CachedBookRepository::new(stores.books, aside.clone()));
        let circulations: Arc<dyn CirculationRepository> =
            Arc::new(CachedCirculationRepository::new(stores.circulations, aside));

        let keys = SigningKeys::from_secret(&config.auth.jwt.secret);
        let deadline = config.auth.deadline();
        let issuer = Arc::new(TokenIssuer::new(
            Arc::clone(&identities),
            sessions.clone(),
            keys.clone(),
            config.auth.token_lifetime(),
        ));
        let validator = Arc::new(TokenValidator::new(
            Arc::clone(&identities),
            sessions.clone(),
            keys,
            deadline,
        ));
        let gate = RoleGate::new(Arc::clone(&identities), deadline);
        let revocation = Arc::new(SessionRevocation::new(Arc::clone(&identities), sessions));
        let authenticator = Arc::new(Authenticator::new(
            Arc::clone(&identities),
            Arc::clone(&hasher),
            Arc::clone(&issuer),
        ));

        let users = UserService::new(Arc::clone(&identities), hasher, gate.clone());
        let role_service =
            RoleService::new(Arc::clone(&roles), Arc::clone(&assignments), gate.clone());
        let health = HealthChecker::new(caches.entities, stores.database, deadline);

        Self {
            config,
            identities,
            roles,
            assignments,
            issuer,
            validator,
            gate,
            revocation,
            authenticator,
            users,
            role_service,
            circulations: CirculationService::new(
                circulations,
                Arc::clone(&members),
                Arc::clone(&books),
            ),
            members: MemberService::new(members),
            books: BookService::new(books),
            health,
        }
    }

    /// Cached identity repository
    pub fn identities(&self) -> Arc<dyn IdentityRepository> {
        Arc::clone(&self.identities)
    }

    pub fn issuer(&self) -> Arc<TokenIssuer> {
        Arc::clone(&self.issuer)
    }

    pub fn validator(&self) -> Arc<TokenValidator> {
        Arc::clone(&self.validator)
    }

    pub fn gate(&self) -> &RoleGate {
        &self.gate
    }

    pub fn revocation(&self) -> Arc<SessionRevocation> {
        Arc::clone(&self.revocation)
    }

    pub fn authenticator(&self) -> Arc<Authenticator> {
        Arc::clone(&self.authenticator)
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    pub fn roles(&self) -> &RoleService {
        &self.role_service
    }

    pub fn members(&self) -> &MemberService {
        &self.members
    }

    pub fn books(&self) -> &BookService {
        &self.books
    }

    pub fn circulations(&self) -> &CirculationService {
        &self.circulations
    }

    pub fn health(&self) -> &HealthChecker {
        &self.health
    }

    /// Create the configured administrator and grant it `admin`
    ///
    /// Idempotent: an existing identity with the same email is reused and the
    /// role is only assigned when missing.
    pub async fn seed_bootstrap_admin(&self) -> Result<()> {
        let Some(admin) = self.config.auth.bootstrap_admin.clone() else {
            return Ok(());
        };

        let identity = match self.identities.get_by_email(&admin.email).await? {
            Some(existing) => existing,
            None => {
                self.users
                    .create(NewUser {
                        name: admin.name,
                        email: admin.email,
                        password: admin.password,
                        avatar: None,
                    })
                    .await?
            }
        };
        if identity.is_admin() {
            return Ok(());
        }

        let role = match self.roles.get_by_name(RoleName::Admin).await? {
            Some(role) => role,
            None => match self.roles.create(RoleName::Admin).await {
                Ok(role) => role,
                // Another instance created it first
                Err(e) if e.is_conflict() => self
                    .roles
                    .get_by_name(RoleName::Admin)
                    .await?
                    .ok_or(e)?,
                Err(e) => return Err(e),
            },
        };
        self.assignments.assign(&identity.id, &role.id).await?;
        info!(identity_id = %identity.id, "Bootstrap admin granted admin role");
        Ok(())
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("health", &self.health)
            .finish_non_exhaustive()
    }
}

/// Build the application context from configuration
pub async fn init_app(config: AppConfig) -> Result<AppContext> {
    info!("Initializing application context");

    let caches = build_cache_providers(&config.cache)?;
    let stores = build_stores(&config).await?;
    info!(
        entity_cache = caches.entities.provider_name(),
        session_store = caches.sessions.provider_name(),
        database = stores.database.is_some(),
        "Resolved providers"
    );

    let context = AppContext::from_parts(config, caches, stores, Arc::new(Argon2PasswordHasher::new()));
    context.seed_bootstrap_admin().await?;
    Ok(context)
}
