//! Book entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalogued book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier
    pub id: String,
    /// Sequential book code (`BK001`, ...)
    pub code: String,
    /// Title, unique across the catalog
    pub title: String,
    /// Cover image reference
    pub cover: Option<String>,
    /// Digital copy reference
    pub document: Option<String>,
    /// Author
    pub author: Option<String>,
    /// Publisher
    pub publisher: Option<String>,
    /// Publication year
    pub year: Option<i32>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Data required to catalogue a book; the code is generated
#[derive(Debug, Clone, Default)]
pub struct NewBook {
    pub title: String,
    pub cover: Option<String>,
    pub document: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
}

/// Partial update of a book
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub cover: Option<String>,
    pub document: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
}
