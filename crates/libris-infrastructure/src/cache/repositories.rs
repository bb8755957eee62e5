//! Cache-aside decorators for the repository ports
//!
//! Each decorator implements the same port as the store it wraps. Lookups by
//! id go through [`CacheAside::read_through`]; mutations call the inner store
//! and invalidate the affected snapshots once it returns successfully.
//! Lookups that feed uniqueness checks and credential checks always hit the
//! durable store.

use super::aside::CacheAside;
use async_trait::async_trait;
use libris_domain::constants::{
    CACHE_KIND_BOOK, CACHE_KIND_CIRCULATION, CACHE_KIND_IDENTITY, CACHE_KIND_MEMBER,
    CACHE_KIND_ROLE,
};
use libris_domain::entities::{
    Book, BookPatch, Circulation, CirculationPatch, CirculationReturn, Credentials, Identity,
    IdentityPatch, Member, MemberPatch, NewBook, NewCirculation, NewIdentity, NewMember, Role,
};
use libris_domain::error::Result;
use libris_domain::repositories::{
    BookRepository, CirculationRepository, IdentityRepository, MemberRepository,
    RoleAssignmentRepository, RoleRepository,
};
use libris_domain::value_objects::{Page, PageRequest, RoleName};
use std::sync::Arc;

/// Identity store with cached id lookups
#[derive(Clone)]
pub struct CachedIdentityRepository {
    inner: Arc<dyn IdentityRepository>,
    cache: CacheAside,
}

impl CachedIdentityRepository {
    /// Wrap `inner`
    pub fn new(inner: Arc<dyn IdentityRepository>, cache: CacheAside) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl IdentityRepository for CachedIdentityRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<Identity>> {
        self.cache
            .read_through(CACHE_KIND_IDENTITY, id, || self.inner.get_by_id(id))
            .await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Identity>> {
        self.inner.get_by_email(email).await
    }

    async fn get_credentials(&self, email: &str) -> Result<Option<Credentials>> {
        self.inner.get_credentials(email).await
    }

    async fn list(&self) -> Result<Vec<Identity>> {
        self.inner.list().await
    }

    async fn create(&self, identity: NewIdentity) -> Result<Identity> {
        self.inner.create(identity).await
    }

    async fn update(&self, id: &str, patch: IdentityPatch) -> Result<Identity> {
        let updated = self.inner.update(id, patch).await?;
        self.cache.invalidate(CACHE_KIND_IDENTITY, id).await;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id).await?;
        self.cache.invalidate(CACHE_KIND_IDENTITY, id).await;
        Ok(())
    }

    async fn increment_token_version(&self, id: &str) -> Result<i64> {
        let version = self.inner.increment_token_version(id).await?;
        self.cache.invalidate(CACHE_KIND_IDENTITY, id).await;
        Ok(version)
    }
}

/// Role store with cached id lookups
///
/// Identity snapshots embed role names, so renaming or deleting a role also
/// invalidates the snapshot of every holder.
#[derive(Clone)]
pub struct CachedRoleRepository {
    inner: Arc<dyn RoleRepository>,
    assignments: Arc<dyn RoleAssignmentRepository>,
    cache: CacheAside,
}

impl CachedRoleRepository {
    /// Wrap `inner`; `assignments` is used to find holders to invalidate
    pub fn new(
        inner: Arc<dyn RoleRepository>,
        assignments: Arc<dyn RoleAssignmentRepository>,
        cache: CacheAside,
    ) -> Self {
        Self {
            inner,
            assignments,
            cache,
        }
    }

    async fn invalidate_role(&self, id: &str, holders: &[String]) {
        self.cache.invalidate(CACHE_KIND_ROLE, id).await;
        self.cache
            .invalidate_all(CACHE_KIND_IDENTITY, holders.iter().map(String::as_str))
            .await;
    }
}

#[async_trait]
impl RoleRepository for CachedRoleRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<Role>> {
        self.cache
            .read_through(CACHE_KIND_ROLE, id, || self.inner.get_by_id(id))
            .await
    }

    async fn get_by_name(&self, name: RoleName) -> Result<Option<Role>> {
        self.inner.get_by_name(name).await
    }

    async fn list(&self) -> Result<Vec<Role>> {
        self.inner.list().await
    }

    async fn create(&self, name: RoleName) -> Result<Role> {
        self.inner.create(name).await
    }

    async fn update(&self, id: &str, name: RoleName) -> Result<Role> {
        let role = self.inner.update(id, name).await?;
        let holders = self.assignments.holders(id).await.unwrap_or_else(|e| {
            tracing::warn!(role_id = id, error = %e, "Could not list role holders for invalidation");
            Vec::new()
        });
        self.invalidate_role(id, &holders).await;
        Ok(role)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        // Assignments cascade with the role, so collect holders first
        let holders = self.assignments.holders(id).await?;
        self.inner.delete(id).await?;
        self.invalidate_role(id, &holders).await;
        Ok(())
    }
}

/// Role assignments; every change invalidates the identity's snapshot
#[derive(Clone)]
pub struct CachedRoleAssignmentRepository {
    inner: Arc<dyn RoleAssignmentRepository>,
    cache: CacheAside,
}

impl CachedRoleAssignmentRepository {
    /// Wrap `inner`
    pub fn new(inner: Arc<dyn RoleAssignmentRepository>, cache: CacheAside) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl RoleAssignmentRepository for CachedRoleAssignmentRepository {
    async fn assign(&self, identity_id: &str, role_id: &str) -> Result<()> {
        self.inner.assign(identity_id, role_id).await?;
        self.cache.invalidate(CACHE_KIND_IDENTITY, identity_id).await;
        Ok(())
    }

    async fn remove(&self, identity_id: &str, role_id: &str) -> Result<bool> {
        let removed = self.inner.remove(identity_id, role_id).await?;
        if removed {
            self.cache.invalidate(CACHE_KIND_IDENTITY, identity_id).await;
        }
        Ok(removed)
    }

    async fn roles_of(&self, identity_id: &str) -> Result<Vec<Role>> {
        self.inner.roles_of(identity_id).await
    }

    async fn holders(&self, role_id: &str) -> Result<Vec<String>> {
        self.inner.holders(role_id).await
    }
}

/// Member store with cached id lookups
#[derive(Clone)]
pub struct CachedMemberRepository {
    inner: Arc<dyn MemberRepository>,
    cache: CacheAside,
}

impl CachedMemberRepository {
    /// Wrap `inner`
    pub fn new(inner: Arc<dyn MemberRepository>, cache: CacheAside) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl MemberRepository for CachedMemberRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<Member>> {
        self.cache
            .read_through(CACHE_KIND_MEMBER, id, || self.inner.get_by_id(id))
            .await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Member>> {
        self.inner.find_by_name(name).await
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Member>> {
        self.inner.find_by_phone(phone).await
    }

    async fn list(&self, request: PageRequest) -> Result<Page<Member>> {
        self.inner.list(request).await
    }

    async fn create(&self, member: NewMember) -> Result<Member> {
        self.inner.create(member).await
    }

    async fn update(&self, id: &str, patch: MemberPatch) -> Result<Member> {
        let member = self.inner.update(id, patch).await?;
        self.cache.invalidate(CACHE_KIND_MEMBER, id).await;
        Ok(member)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id).await?;
        self.cache.invalidate(CACHE_KIND_MEMBER, id).await;
        Ok(())
    }
}

/// Book store with cached id lookups
#[derive(Clone)]
pub struct CachedBookRepository {
    inner: Arc<dyn BookRepository>,
    cache: CacheAside,
}

impl CachedBookRepository {
    /// Wrap `inner`
    pub fn new(inner: Arc<dyn BookRepository>, cache: CacheAside) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl BookRepository for CachedBookRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<Book>> {
        self.cache
            .read_through(CACHE_KIND_BOOK, id, || self.inner.get_by_id(id))
            .await
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Book>> {
        self.inner.find_by_title(title).await
    }

    async fn list(&self, request: PageRequest) -> Result<Page<Book>> {
        self.inner.list(request).await
    }

    async fn create(&self, book: NewBook) -> Result<Book> {
        self.inner.create(book).await
    }

    async fn update(&self, id: &str, patch: BookPatch) -> Result<Book> {
        let book = self.inner.update(id, patch).await?;
        self.cache.invalidate(CACHE_KIND_BOOK, id).await;
        Ok(book)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id).await?;
        self.cache.invalidate(CACHE_KIND_BOOK, id).await;
        Ok(())
    }
}

/// Circulation store with cached id lookups
///
/// The open-loan lookup guards against lending a book twice, so it always
/// reads the durable store.
#[derive(Clone)]
pub struct CachedCirculationRepository {
    inner: Arc<dyn CirculationRepository>,
    cache: CacheAside,
}

impl CachedCirculationRepository {
    /// Wrap `inner`
    pub fn new(inner: Arc<dyn CirculationRepository>, cache: CacheAside) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl CirculationRepository for CachedCirculationRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<Circulation>> {
        self.cache
            .read_through(CACHE_KIND_CIRCULATION, id, || self.inner.get_by_id(id))
            .await
    }

    async fn find_open_by_book(&self, book_id: &str) -> Result<Option<Circulation>> {
        self.inner.find_open_by_book(book_id).await
    }

    async fn list(&self, request: PageRequest) -> Result<Page<Circulation>> {
        self.inner.list(request).await
    }

    async fn create(&self, circulation: NewCirculation) -> Result<Circulation> {
        self.inner.create(circulation).await
    }

    async fn update(&self, id: &str, patch: CirculationPatch) -> Result<Circulation> {
        let loan = self.inner.update(id, patch).await?;
        self.cache.invalidate(CACHE_KIND_CIRCULATION, id).await;
        Ok(loan)
    }

    async fn mark_returned(&self, id: &str, returned: CirculationReturn) -> Result<Circulation> {
        let loan = self.inner.mark_returned(id, returned).await?;
        self.cache.invalidate(CACHE_KIND_CIRCULATION, id).await;
        Ok(loan)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id).await?;
        self.cache.invalidate(CACHE_KIND_CIRCULATION, id).await;
        Ok(())
    }
}
