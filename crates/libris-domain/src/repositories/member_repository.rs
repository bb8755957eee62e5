//! Member Repository Interface

use crate::entities::{Member, MemberPatch, NewMember};
use crate::error::Result;
use crate::value_objects::{Page, PageRequest};
use async_trait::async_trait;

/// Repository: library members
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Fetch a member by id
    async fn get_by_id(&self, id: &str) -> Result<Option<Member>>;

    /// Fetch a member by exact name
    async fn find_by_name(&self, name: &str) -> Result<Option<Member>>;

    /// Fetch a member by phone number
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Member>>;

    /// One page of members ordered by code
    async fn list(&self, request: PageRequest) -> Result<Page<Member>>;

    /// Create a member, generating the next sequential code
    ///
    /// Code generation runs under serializable isolation and is retried on
    /// serialization failures; exhaustion surfaces as `Contention`.
    async fn create(&self, member: NewMember) -> Result<Member>;

    /// Apply a partial update
    async fn update(&self, id: &str, patch: MemberPatch) -> Result<Member>;

    /// Delete a member
    async fn delete(&self, id: &str) -> Result<()>;
}
