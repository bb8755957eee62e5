//! # Libris Server
//!
//! HTTP surface of the Libris library-management backend.
//!
//! Every route lives under `/api`. Protected routes take a request guard:
//! [`guards::Authenticated`] runs the token validator, and
//! [`guards::Gated`] additionally runs the role gate against the roles the
//! route permits. Failures of either collapse into one generic 401 or 403
//! body; the cause is only logged.
//!
//! ## Core Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`build_rocket`] | Assemble routes, catchers and managed state |
//! | [`run`] | Load config, initialize logging and the app context, serve |
//! | [`responses::ApiError`] | Error half of every handler result |

pub mod builder;
pub mod constants;
pub mod guards;
pub mod handlers;
pub mod init;
pub mod payloads;
pub mod rate_limit;
pub mod responses;

pub use builder::build_rocket;
pub use init::run;
