//! PostgreSQL repositories over an r2d2 connection pool
//!
//! The `postgres` client is synchronous, so every repository call runs on a
//! blocking thread through [`DatabasePool::run`]. If the awaiting future is
//! dropped (client disconnect, deadline), a cancel request is sent for the
//! statement still running on that connection.
//!
//! ## Tables
//!
//! See `sql/schema.sql` in this crate for the expected schema.

pub mod cancel;
pub mod catalog;
pub mod directory;
pub mod sequence;

pub use catalog::PostgresCatalog;
pub use directory::PostgresDirectory;

use crate::constants::{
    DB_CONNECTION_IDLE_TIMEOUT_SECS, DB_CONNECTION_MAX_LIFETIME_SECS, DB_CONNECTION_TIMEOUT_SECS,
    DB_MAX_CONNECTIONS, DB_MIN_IDLE,
};
use cancel::CancelOnDrop;
use chrono::{DateTime, NaiveDate, Utc};
use libris_domain::error::{Error, Result};
use r2d2::Pool;
use r2d2_postgres::PostgresConnectionManager;
use r2d2_postgres::postgres::error::SqlState;
use r2d2_postgres::postgres::{Client, NoTls};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// `[database]` section
///
/// Timeouts are whole seconds so they read naturally in TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Off: identities, roles and the catalog live in process memory
    pub enabled: bool,
    pub url: String,
    /// Run `schema.sql` at startup; it only creates what is missing
    pub apply_schema: bool,
    pub max_connections: u32,
    pub min_idle: u32,
    pub max_lifetime_secs: u64,
    pub idle_timeout_secs: u64,
    /// How long a caller waits to check a connection out
    pub checkout_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            apply_schema: false,
            max_connections: DB_MAX_CONNECTIONS,
            min_idle: DB_MIN_IDLE,
            max_lifetime_secs: DB_CONNECTION_MAX_LIFETIME_SECS,
            idle_timeout_secs: DB_CONNECTION_IDLE_TIMEOUT_SECS,
            checkout_timeout_secs: DB_CONNECTION_TIMEOUT_SECS,
        }
    }
}

/// Shared r2d2 pool of synchronous `postgres` clients
#[derive(Clone)]
pub struct DatabasePool {
    pool: Pool<PostgresConnectionManager<NoTls>>,
}

impl DatabasePool {
    /// Only the URL is checked here; r2d2 opens connections in the background
    pub fn new(config: &DatabaseConfig) -> Result<Self> {
        let params = config
            .url
            .parse()
            .map_err(|e| Error::configuration_with_source("Invalid database URL", e))?;
        let pool = Pool::builder()
            .max_size(config.max_connections)
            .min_idle(Some(config.min_idle))
            .max_lifetime(Some(Duration::from_secs(config.max_lifetime_secs)))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_secs)))
            .connection_timeout(Duration::from_secs(config.checkout_timeout_secs))
            .build_unchecked(PostgresConnectionManager::new(params, NoTls));
        Ok(Self { pool })
    }

    /// Run `op` with a pooled connection on a blocking thread
    ///
    /// Dropping the returned future cancels the statement in flight.
    pub async fn run<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Client) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let guard = CancelOnDrop::new();
        let slot = guard.slot();

        let task = tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| Error::database_with_source("Failed to get database connection", e))?;
            slot.arm(conn.cancel_token());
            let result = op(&mut conn);
            slot.clear();
            result
        });

        let joined = task.await;
        guard.disarm();
        joined.map_err(|e| Error::internal(format!("Database task failed: {e}")))?
    }

    /// `SELECT 1` on a pooled connection
    pub async fn health_check(&self) -> Result<()> {
        self.run(|client| {
            client
                .execute("SELECT 1", &[])
                .map(|_| ())
                .map_err(|e| Error::database_with_source("Database health check failed", e))
        })
        .await
    }

    /// Create missing tables; existing ones are left untouched
    pub async fn apply_schema(&self) -> Result<()> {
        self.run(|client| {
            client
                .batch_execute(SCHEMA_SQL)
                .map_err(|e| Error::database_with_source("Failed to apply schema", e))
        })
        .await
    }

    pub fn stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            open: state.connections,
            idle: state.idle_connections,
            capacity: self.pool.max_size(),
        }
    }
}

/// Connection counts reported by the health endpoint
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PoolStats {
    pub open: u32,
    pub idle: u32,
    pub capacity: u32,
}

/// Convert a `postgres` error, keeping constraint violations distinguishable
///
/// A taken unique column is `AlreadyExists`; a dangling or still-referenced
/// foreign key is `InvalidArgument`.
pub(crate) fn map_pg_error(context: &str, err: r2d2_postgres::postgres::Error) -> Error {
    let constraint = err
        .as_db_error()
        .and_then(|db| db.constraint())
        .map(ToString::to_string);
    match err.code() {
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => Error::already_exists(format!(
            "{context}: {} violated",
            constraint.as_deref().unwrap_or("unique constraint")
        )),
        Some(code) if *code == SqlState::FOREIGN_KEY_VIOLATION => {
            Error::invalid_argument(format!(
                "{context}: {} violated",
                constraint.as_deref().unwrap_or("foreign key")
            ))
        }
        _ => Error::database_with_source(context.to_string(), err),
    }
}

/// Parse a `DATE` column selected as `::TEXT`
pub(crate) fn calendar_day(text: &str) -> Result<NaiveDate> {
    text.parse()
        .map_err(|e| Error::database_with_source(format!("Unreadable date '{text}'"), e))
}

/// Convert an epoch-seconds column into a UTC timestamp
pub(crate) fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}
