//! HTTP server configuration types

use crate::constants::{DEFAULT_SERVER_ADDRESS, DEFAULT_SERVER_PORT};
use serde::{Deserialize, Serialize};

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub address: String,

    /// Listening port
    pub port: u16,

    /// Hide internal error messages from response bodies
    pub production: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_SERVER_ADDRESS.to_string(),
            port: DEFAULT_SERVER_PORT,
            production: true,
        }
    }
}
