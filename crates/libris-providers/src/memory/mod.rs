//! In-memory repositories
//!
//! Authoritative stores held in process memory. Used when no database is
//! configured and throughout the test suites. Every port call counts as one
//! durable-store query (see `query_count`), which lets tests observe whether
//! a read was served from the cache.

pub mod catalog;
pub mod directory;

pub use catalog::InMemoryCatalog;
pub use directory::InMemoryDirectory;

use libris_domain::error::{Error, Result};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

fn read_lock<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| Error::internal("In-memory store lock poisoned"))
}

fn write_lock<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| Error::internal("In-memory store lock poisoned"))
}
