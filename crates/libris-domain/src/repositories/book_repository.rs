//! Book Repository Interface

use crate::entities::{Book, BookPatch, NewBook};
use crate::error::Result;
use crate::value_objects::{Page, PageRequest};
use async_trait::async_trait;

/// Repository: catalogued books
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Fetch a book by id
    async fn get_by_id(&self, id: &str) -> Result<Option<Book>>;

    /// Fetch a book by exact title
    async fn find_by_title(&self, title: &str) -> Result<Option<Book>>;

    /// One page of books ordered by code
    async fn list(&self, request: PageRequest) -> Result<Page<Book>>;

    /// Create a book, generating the next sequential code
    async fn create(&self, book: NewBook) -> Result<Book>;

    /// Apply a partial update
    async fn update(&self, id: &str, patch: BookPatch) -> Result<Book>;

    /// Delete a book
    async fn delete(&self, id: &str) -> Result<()>;
}
