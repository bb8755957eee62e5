//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Domain-specific constants are defined in `libris_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "libris.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "libris";

/// Environment variable prefix for configuration (`LIBRIS__AUTH__JWT__SECRET`)
pub const CONFIG_ENV_PREFIX: &str = "LIBRIS__";

/// Separator for nested keys in environment variables
pub const CONFIG_ENV_SEPARATOR: &str = "__";

/// Environment variable overriding the configured log filter
pub const LOG_FILTER_ENV: &str = "LIBRIS_LOG";

// ============================================================================
// AUTHENTICATION CONSTANTS
// ============================================================================

/// Session token lifetime in seconds (4 hours)
pub const JWT_DEFAULT_EXPIRATION_SECS: u64 = 14_400;

/// Minimum accepted signing secret length
pub const JWT_MIN_SECRET_LENGTH: usize = 32;

/// Deadline for token validation and role gating, in milliseconds
pub const AUTH_DEFAULT_DEADLINE_MS: u64 = 3_000;

/// Bearer token scheme in the `Authorization` header
pub const BEARER_SCHEME: &str = "Bearer";

// ============================================================================
// CACHE CONSTANTS
// ============================================================================

/// Entity snapshot TTL in seconds (5 minutes)
pub const CACHE_DEFAULT_ENTITY_TTL_SECS: u64 = 300;

/// Upper bound for a single cache operation, in milliseconds
pub const CACHE_DEFAULT_OPERATION_TIMEOUT_MS: u64 = 250;

/// Default number of entries held by the in-process cache
pub const CACHE_DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Cache key separator (`user:<id>`, `session:<token>`)
pub const CACHE_KEY_SEPARATOR: &str = ":";

// ============================================================================
// HTTP SERVER CONSTANTS
// ============================================================================

/// Default bind address
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1";

/// Default HTTP port
pub const DEFAULT_SERVER_PORT: u16 = 8000;

// ============================================================================
// RATE LIMIT CONSTANTS
// ============================================================================

/// Requests allowed per client per window
pub const RATE_LIMIT_DEFAULT_MAX_REQUESTS: u32 = 100;

/// Rate limit window in seconds
pub const RATE_LIMIT_DEFAULT_WINDOW_SECS: u64 = 60;

/// Failed logins before a client is locked out
pub const RATE_LIMIT_DEFAULT_MAX_FAILED_ATTEMPTS: u32 = 5;

/// Lockout duration in seconds
pub const RATE_LIMIT_DEFAULT_LOCKOUT_SECS: u64 = 300;

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";
