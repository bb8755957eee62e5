//! Provider Constants
//!
//! Constants specific to provider implementations. Domain constants live in
//! `libris-domain`; operational defaults that are configurable live in the
//! infrastructure constants.

// ============================================================================
// CACHE PROVIDER CONSTANTS
// ============================================================================

/// Default maximum number of entries held by the Moka cache
pub const CACHE_DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Default per-command timeout for Redis round trips (milliseconds)
pub const REDIS_COMMAND_TIMEOUT_MS: u64 = 250;

// ============================================================================
// DATABASE PROVIDER CONSTANTS
// ============================================================================

/// Default maximum pool size
pub const DB_MAX_CONNECTIONS: u32 = 20;

/// Default minimum idle connections
pub const DB_MIN_IDLE: u32 = 2;

/// Default maximum connection lifetime (seconds)
pub const DB_CONNECTION_MAX_LIFETIME_SECS: u64 = 1800;

/// Default idle timeout (seconds)
pub const DB_CONNECTION_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default connection checkout timeout (seconds)
pub const DB_CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Attempts made for a serializable code-generation transaction
pub const SEQUENCE_MAX_ATTEMPTS: u32 = 3;

// ============================================================================
// PASSWORD HASHING CONSTANTS
// ============================================================================

/// Prefix identifying Argon2 PHC strings
pub const ARGON2_HASH_PREFIX: &str = "$argon2";

/// Prefix identifying bcrypt hashes (`$2a$`, `$2b$`, `$2y$`)
pub const BCRYPT_HASH_PREFIX: &str = "$2";
