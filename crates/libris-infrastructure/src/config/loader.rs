//! Figment-layered configuration
//!
//! Later layers win: [`AppConfig::default`], then `libris.toml`, then
//! `LIBRIS__`-prefixed environment variables with `__` between nested keys
//! (`LIBRIS__AUTH__JWT__SECRET`). The merged result is validated once.

use crate::config::{
    AppConfig, AuthConfig, CacheConfig, CacheProviderKind, DatabaseConfig, RateLimitConfig,
};
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
    JWT_MIN_SECRET_LENGTH,
};
use crate::error_ext::ErrorContext;
use crate::logging::{log_config_source, parse_log_level};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use libris_domain::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Where to look for `libris.toml`
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    explicit: Option<PathBuf>,
}

impl ConfigLoader {
    /// Search the working directory, `./libris/` and the user config dir
    pub fn new() -> Self {
        Self::default()
    }

    /// Read exactly this file; a missing file falls back to defaults
    pub fn with_config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.explicit = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        match self.file() {
            Some(path) if path.is_file() => {
                log_config_source(&path, true);
                figment = figment.merge(Toml::file(path));
            }
            Some(path) => log_config_source(&path, false),
            None => {}
        }

        let config: AppConfig = figment
            .merge(Env::prefixed(CONFIG_ENV_PREFIX).split(CONFIG_ENV_SEPARATOR))
            .extract()
            .config_context("Failed to extract configuration")?;
        validate_app_config(&config)?;
        Ok(config)
    }

    /// Write `config` as pretty TOML
    pub fn save_to_file(&self, config: &AppConfig, path: impl AsRef<Path>) -> Result<()> {
        let body = toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;
        std::fs::write(path, body).context("Failed to write config file")
    }

    fn file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.explicit {
            return Some(path.clone());
        }
        let cwd = std::env::current_dir().ok()?;
        [
            Some(cwd.join(DEFAULT_CONFIG_FILENAME)),
            Some(cwd.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME)),
            dirs::config_dir().map(|dir| dir.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME)),
        ]
        .into_iter()
        .flatten()
        .find(|candidate| candidate.is_file())
    }
}

/// Reject settings the server cannot start with
pub fn validate_app_config(config: &AppConfig) -> Result<()> {
    validate_server_config(config)?;
    validate_auth_config(&config.auth)?;
    validate_cache_config(&config.cache)?;
    validate_database_config(&config.database)?;
    validate_rate_limit_config(config)?;
    parse_log_level(&config.logging.level)?;
    Ok(())
}

fn validate_server_config(config: &AppConfig) -> Result<()> {
    if config.server.port == 0 {
        return Err(Error::configuration("Server port cannot be 0"));
    }
    Ok(())
}

fn validate_auth_config(auth: &AuthConfig) -> Result<()> {
    if auth.jwt.secret.is_empty() {
        return Err(Error::configuration(
            "JWT secret cannot be empty; set LIBRIS__AUTH__JWT__SECRET",
        ));
    }
    if auth.jwt.secret.len() < JWT_MIN_SECRET_LENGTH {
        return Err(Error::configuration(format!(
            "JWT secret should be at least {JWT_MIN_SECRET_LENGTH} characters long"
        )));
    }
    if auth.jwt.expiration_secs == 0 {
        return Err(Error::configuration("JWT expiration cannot be 0"));
    }
    if auth.deadline_ms == 0 {
        return Err(Error::configuration("Authentication deadline cannot be 0"));
    }
    if let Some(admin) = &auth.bootstrap_admin {
        if admin.email.is_empty() || admin.password.is_empty() {
            return Err(Error::configuration(
                "Bootstrap admin requires both email and password",
            ));
        }
    }
    Ok(())
}

fn validate_cache_config(cache: &CacheConfig) -> Result<()> {
    if cache.entity_ttl_secs == 0 {
        return Err(Error::configuration("Cache entity TTL cannot be 0"));
    }
    if cache.operation_timeout_ms == 0 {
        return Err(Error::configuration("Cache operation timeout cannot be 0"));
    }
    if cache.provider == CacheProviderKind::Redis
        && cache.redis_url.as_deref().is_none_or(str::is_empty)
    {
        return Err(Error::configuration(
            "Redis URL is required when the redis cache provider is selected",
        ));
    }
    Ok(())
}

fn validate_database_config(database: &DatabaseConfig) -> Result<()> {
    if database.enabled && database.url.is_empty() {
        return Err(Error::configuration(
            "Database URL is required when the database is enabled",
        ));
    }
    if database.enabled && database.max_connections == 0 {
        return Err(Error::configuration("Database pool size cannot be 0"));
    }
    Ok(())
}

fn validate_rate_limit_config(config: &AppConfig) -> Result<()> {
    let limits = &config.rate_limit;
    if limits.enabled && (limits.max_requests == 0 || limits.window_secs == 0) {
        return Err(Error::configuration(
            "Rate limit requests and window must be positive when limiting is enabled",
        ));
    }
    Ok(())
}

/// Programmatic [`AppConfig`] for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder(AppConfig);

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.0.auth.jwt.secret = secret.into();
        self
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.0.auth = auth;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.0.cache = cache;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.0.rate_limit = rate_limit;
        self
    }

    /// Error details are included in responses
    pub fn development(mut self) -> Self {
        self.0.server.production = false;
        self
    }

    pub fn build(self) -> AppConfig {
        self.0
    }
}
