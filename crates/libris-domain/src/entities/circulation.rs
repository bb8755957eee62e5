//! Circulation record: one book lent to one member

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A loan of a book to a member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circulation {
    /// Unique identifier
    pub id: String,
    /// Sequential loan code (`SKL001`, ...)
    pub code: String,
    /// Borrowing member
    pub member_id: String,
    /// Lent book
    pub book_id: String,
    /// Day the book left the library
    pub borrowed_on: NaiveDate,
    /// Day the book is due back
    pub due_on: NaiveDate,
    /// Day the book came back; `None` while the loan is open
    pub returned_on: Option<NaiveDate>,
    /// Fine charged on the loan, in whole currency units
    pub fine: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Circulation {
    /// The book has not been returned yet
    pub fn is_open(&self) -> bool {
        self.returned_on.is_none()
    }

    /// Still open after its due day
    pub fn is_overdue_on(&self, day: NaiveDate) -> bool {
        self.is_open() && day > self.due_on
    }
}

/// Data required to record a loan; the code is generated
#[derive(Debug, Clone)]
pub struct NewCirculation {
    pub member_id: String,
    pub book_id: String,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
    pub fine: i64,
}

/// Partial update of a loan
#[derive(Debug, Clone, Default)]
pub struct CirculationPatch {
    pub member_id: Option<String>,
    pub book_id: Option<String>,
    pub borrowed_on: Option<NaiveDate>,
    pub due_on: Option<NaiveDate>,
    pub fine: Option<i64>,
}

/// Closing a loan
#[derive(Debug, Clone, Copy)]
pub struct CirculationReturn {
    /// Day the book came back
    pub returned_on: NaiveDate,
    /// Fine charged, replacing the recorded one
    pub fine: i64,
}
