//! # Libris - Provider Implementations
//!
//! This crate contains the concrete implementations of the ports defined in
//! `libris-domain`.
//!
//! ## Provider Categories
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Cache | `CacheProvider` | Moka, Redis, Null |
//! | Password | `PasswordHasher` | Argon2id (bcrypt verify for legacy hashes) |
//! | Repositories | `IdentityRepository`, `RoleRepository`, ... | PostgreSQL, in-memory |
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! libris-providers = { version = "0.1", default-features = false, features = ["cache-redis", "database-postgres"] }
//! ```

// Re-export domain types commonly used with providers
pub use libris_domain::error::{Error, Result};
pub use libris_domain::ports::providers::{CacheProvider, PasswordHasher};

/// Provider-specific constants
pub mod constants;

/// Cache provider implementations
pub mod cache;

/// Password hashing implementations
pub mod crypto;

/// In-memory repositories for development and tests
pub mod memory;

/// PostgreSQL repositories over an r2d2 pool
#[cfg(feature = "database-postgres")]
pub mod database;
