//! Rate limiting configuration types

use crate::constants::{
    RATE_LIMIT_DEFAULT_LOCKOUT_SECS, RATE_LIMIT_DEFAULT_MAX_FAILED_ATTEMPTS,
    RATE_LIMIT_DEFAULT_MAX_REQUESTS, RATE_LIMIT_DEFAULT_WINDOW_SECS,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-client request limiting and failed-login lockout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether limiting is applied
    pub enabled: bool,

    /// Maximum requests per window
    pub max_requests: u32,

    /// Window length in seconds
    pub window_secs: u64,

    /// Failed logins before lockout
    pub max_failed_attempts: u32,

    /// Lockout duration in seconds
    pub lockout_secs: u64,
}

impl RateLimitConfig {
    /// Window as a duration
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Lockout as a duration
    pub fn lockout(&self) -> Duration {
        Duration::from_secs(self.lockout_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: RATE_LIMIT_DEFAULT_MAX_REQUESTS,
            window_secs: RATE_LIMIT_DEFAULT_WINDOW_SECS,
            max_failed_attempts: RATE_LIMIT_DEFAULT_MAX_FAILED_ATTEMPTS,
            lockout_secs: RATE_LIMIT_DEFAULT_LOCKOUT_SECS,
        }
    }
}
