//! Server-specific constants

/// Mount point of every route
pub const API_PREFIX: &str = "/api";

/// Header carrying the bearer credential
pub const AUTHORIZATION_HEADER: &str = "Authorization";
