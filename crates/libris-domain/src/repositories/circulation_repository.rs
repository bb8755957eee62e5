//! Circulation Repository Interface

use crate::entities::{Circulation, CirculationPatch, CirculationReturn, NewCirculation};
use crate::error::Result;
use crate::value_objects::{Page, PageRequest};
use async_trait::async_trait;

/// Repository: loans of books to members
///
/// Member and book existence is checked by the caller; the store only
/// records the references.
#[async_trait]
pub trait CirculationRepository: Send + Sync {
    /// Fetch a loan by id
    async fn get_by_id(&self, id: &str) -> Result<Option<Circulation>>;

    /// The open loan of a book, if it is currently lent out
    async fn find_open_by_book(&self, book_id: &str) -> Result<Option<Circulation>>;

    /// One page of loans ordered by code
    async fn list(&self, request: PageRequest) -> Result<Page<Circulation>>;

    /// Record a loan, generating the next sequential `SKL` code
    async fn create(&self, circulation: NewCirculation) -> Result<Circulation>;

    /// Apply a partial update
    async fn update(&self, id: &str, patch: CirculationPatch) -> Result<Circulation>;

    /// Close an open loan
    ///
    /// Fails with `InvalidArgument` when the loan was already returned.
    async fn mark_returned(&self, id: &str, returned: CirculationReturn) -> Result<Circulation>;

    /// Delete a loan
    async fn delete(&self, id: &str) -> Result<()>;
}
