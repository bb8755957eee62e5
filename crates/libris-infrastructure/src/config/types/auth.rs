//! Authentication configuration types

use crate::constants::{AUTH_DEFAULT_DEADLINE_MS, JWT_DEFAULT_EXPIRATION_SECS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HMAC-SHA256 signing secret
    ///
    /// **REQUIRED**. Configure via `LIBRIS__AUTH__JWT__SECRET` or
    /// `auth.jwt.secret` in the config file. At least 32 characters.
    pub secret: String,

    /// Session token lifetime in seconds
    pub expiration_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            // Empty by default; the loader rejects it
            secret: String::new(),
            expiration_secs: JWT_DEFAULT_EXPIRATION_SECS,
        }
    }
}

/// First administrator created at startup when no identity uses its email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdminConfig {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Plain-text password, hashed before storage
    pub password: String,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Deadline for token validation plus role gating, in milliseconds
    pub deadline_ms: u64,

    /// Optional administrator seeded at startup
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

impl AuthConfig {
    /// Token lifetime as a duration
    pub fn token_lifetime(&self) -> Duration {
        Duration::from_secs(self.jwt.expiration_secs)
    }

    /// Validation deadline as a duration
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            deadline_ms: AUTH_DEFAULT_DEADLINE_MS,
            bootstrap_admin: None,
        }
    }
}
