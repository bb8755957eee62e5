//! Configuration management
//!
//! Layered configuration: built-in defaults, an optional TOML file
//! (`libris.toml`) and `LIBRIS__`-prefixed environment variables, merged by
//! figment and validated once at startup.

pub mod loader;
pub mod types;

pub use loader::{ConfigBuilder, ConfigLoader};
pub use types::*;
