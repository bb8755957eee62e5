//! Attaching context to foreign errors
//!
//! Used where the config loader and blocking tasks hand back `io`, `toml`,
//! `figment` or join errors that must become a domain [`Error`] with the
//! original kept as its source.

use libris_domain::error::{Error, Result};
use std::fmt::Display;

/// `Result` adapter that prefixes the failure with what was being attempted
///
/// ```ignore
/// std::fs::write(&path, body).context("Failed to write config file")?;
/// figment.extract().config_context("Failed to extract configuration")?;
/// ```
pub trait ErrorContext<T> {
    /// Wrap as [`Error::Infrastructure`]
    fn context(self, context: impl Display) -> Result<T>;

    /// Like [`ErrorContext::context`], building the message only on failure
    fn with_context<C: Display>(self, context: impl FnOnce() -> C) -> Result<T>;

    /// Wrap as [`Error::Configuration`]
    fn config_context(self, context: impl Display) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Display) -> Result<T> {
        self.map_err(|err| Error::infrastructure_with_source(format!("{context}: {err}"), err))
    }

    fn with_context<C: Display>(self, context: impl FnOnce() -> C) -> Result<T> {
        self.map_err(|err| {
            Error::infrastructure_with_source(format!("{}: {err}", context()), err)
        })
    }

    fn config_context(self, context: impl Display) -> Result<T> {
        self.map_err(|err| Error::configuration_with_source(format!("{context}: {err}"), err))
    }
}

/// A `spawn_blocking` task that panicked or was cancelled
pub fn join_error(err: tokio::task::JoinError, context: &str) -> Error {
    Error::internal(format!("{context}: {err}"))
}
