//! External Provider Ports
//!
//! | Port | Description |
//! |------|-------------|
//! | CacheProvider | Ephemeral key/value store with per-entry TTL |
//! | PasswordHasher | Credential hashing and verification |

/// Cache provider port
pub mod cache;
/// Password hashing port
pub mod password;

// Re-export provider ports for convenience
pub use cache::{CacheEntryConfig, CacheProvider, CacheStats};
pub use password::PasswordHasher;
