//! Domain Port Interfaces
//!
//! Boundary contracts implemented by the providers crate. Repository
//! ports live in [`crate::repositories`].
//!
//! ## Organization
//!
//! - **providers/** - External service provider ports (cache, password hashing)

/// External service provider ports
pub mod providers;

// Re-export commonly used port traits for convenience
pub use providers::{CacheEntryConfig, CacheProvider, CacheStats, PasswordHasher};
