//! Libris application core
//!
//! Everything between the HTTP surface and the concrete backends in
//! `libris-providers`: the auth core (issuer, validator, role gate,
//! revocation), the cache-aside discipline, the services that own the
//! commit-then-invalidate rule, and the startup plumbing (config, logging,
//! health). [`AppContext`] wires them together.

pub mod auth;
pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod constants;
pub mod error_ext;
pub mod health;
pub mod logging;
pub mod services;

pub use bootstrap::{AppContext, CacheProviders, Stores, init_app};
pub use error_ext::ErrorContext;
