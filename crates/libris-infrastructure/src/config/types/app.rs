//! Root of the configuration tree

use super::{
    AuthConfig, CacheConfig, DatabaseConfig, LoggingConfig, RateLimitConfig, ServerConfig,
};
use serde::{Deserialize, Serialize};

/// Everything `libris.toml` can set; every section may be omitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub cache: CacheConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub rate_limit: RateLimitConfig,
}

