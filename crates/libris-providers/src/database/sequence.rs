//! Sequential code allocation inside a serializable transaction
//!
//! The current maximum is read with `FOR UPDATE` and the new row inserted
//! in the same SERIALIZABLE transaction. Concurrent allocators that would
//! produce the same code fail with a serialization error (or hit the unique
//! constraint on `code`) and retry. Exhausting the retries is reported as
//! [`Error::Contention`].

use super::map_pg_error;
use crate::constants::SEQUENCE_MAX_ATTEMPTS;
use libris_domain::error::{Error, Result};
use libris_domain::value_objects::SequenceCode;
use r2d2_postgres::postgres::error::SqlState;
use r2d2_postgres::postgres::{Client, IsolationLevel, Transaction};

/// Table and prefix of a code sequence
#[derive(Debug, Clone, Copy)]
pub struct CodeSequence {
    /// Table holding the `code` column
    pub table: &'static str,
    /// Code prefix (`ID`, `BK`)
    pub prefix: &'static str,
}

enum Attempt {
    Retry(r2d2_postgres::postgres::Error),
    Fail(Error),
}

impl From<r2d2_postgres::postgres::Error> for Attempt {
    fn from(err: r2d2_postgres::postgres::Error) -> Self {
        if is_retryable(&err) {
            Attempt::Retry(err)
        } else {
            Attempt::Fail(map_pg_error("Failed to allocate code", err))
        }
    }
}

fn is_retryable(err: &r2d2_postgres::postgres::Error) -> bool {
    match err.code() {
        Some(code)
            if *code == SqlState::T_R_SERIALIZATION_FAILURE
                || *code == SqlState::T_R_DEADLOCK_DETECTED =>
        {
            true
        }
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => err
            .as_db_error()
            .and_then(|db| db.constraint())
            .is_some_and(|constraint| constraint.ends_with("_code_key")),
        _ => false,
    }
}

/// Allocate the next code and insert the row carrying it
///
/// `insert` receives the open transaction and the allocated code; it must
/// not commit.
pub fn insert_with_code<T, F>(client: &mut Client, sequence: CodeSequence, insert: F) -> Result<T>
where
    F: Fn(&mut Transaction<'_>, &str) -> std::result::Result<T, r2d2_postgres::postgres::Error>,
{
    let max_query = format!(
        "SELECT code FROM {} ORDER BY length(code) DESC, code DESC LIMIT 1 FOR UPDATE",
        sequence.table
    );

    for attempt in 1..=SEQUENCE_MAX_ATTEMPTS {
        match try_insert(client, sequence, &max_query, &insert) {
            Ok(value) => return Ok(value),
            Err(Attempt::Fail(err)) => return Err(err),
            Err(Attempt::Retry(err)) => {
                tracing::debug!(
                    table = sequence.table,
                    attempt,
                    error = %err,
                    "Code allocation conflicted, retrying"
                );
            }
        }
    }

    Err(Error::contention(format!(
        "Could not allocate a {} code after {} attempts",
        sequence.prefix, SEQUENCE_MAX_ATTEMPTS
    )))
}

fn try_insert<T, F>(
    client: &mut Client,
    sequence: CodeSequence,
    max_query: &str,
    insert: &F,
) -> std::result::Result<T, Attempt>
where
    F: Fn(&mut Transaction<'_>, &str) -> std::result::Result<T, r2d2_postgres::postgres::Error>,
{
    let mut tx = client
        .build_transaction()
        .isolation_level(IsolationLevel::Serializable)
        .start()?;

    let last: Option<String> = tx.query_opt(max_query, &[])?.map(|row| row.get(0));
    let code = SequenceCode::next_after(sequence.prefix, last.as_deref()).map_err(Attempt::Fail)?;

    let value = insert(&mut tx, &code.to_string())?;
    tx.commit()?;
    Ok(value)
}
