//! One module per top-level TOML section

pub mod app;
pub mod auth;
pub mod cache;
pub mod logging;
pub mod rate_limit;
pub mod server;

pub use app::AppConfig;
pub use auth::{AuthConfig, BootstrapAdminConfig, JwtConfig};
pub use cache::{CacheConfig, CacheProviderKind};
pub use libris_providers::database::DatabaseConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;
