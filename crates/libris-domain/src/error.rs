//! Domain error
//!
//! One enum shared by every crate. Variants with a `source` keep the
//! foreign error that caused them; the transport layer only looks at the
//! variant to pick a status.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Foreign error kept as the cause of a domain error
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON parsing error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Generic(#[from] BoxedSource),

    /// `resource` is `<kind>:<id>`, e.g. `user:42`
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A unique column (email, role name, member or book code) is taken
    #[error("Already exists: {message}")]
    AlreadyExists { message: String },

    /// Authenticated but not allowed, including admin self-protection
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Concurrent writers kept colliding on a sequence
    #[error("Contention: {message}")]
    Contention { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Cache error: {message}")]
    Cache {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Infrastructure error: {message}")]
    Infrastructure {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

/// `name(message)` constructors for message-only variants
macro_rules! message_constructors {
    ($($name:ident => $variant:ident),* $(,)?) => {
        impl Error {
            $(
                pub fn $name(message: impl Into<String>) -> Self {
                    Self::$variant { message: message.into() }
                }
            )*
        }
    };
}

/// `name(message)` and `name_with_source(message, err)` for sourced variants
macro_rules! sourced_constructors {
    ($($name:ident, $with_source:ident => $variant:ident),* $(,)?) => {
        impl Error {
            $(
                pub fn $name(message: impl Into<String>) -> Self {
                    Self::$variant { message: message.into(), source: None }
                }

                pub fn $with_source<E>(message: impl Into<String>, source: E) -> Self
                where
                    E: std::error::Error + Send + Sync + 'static,
                {
                    Self::$variant {
                        message: message.into(),
                        source: Some(Box::new(source)),
                    }
                }
            )*
        }
    };
}

message_constructors! {
    invalid_argument => InvalidArgument,
    already_exists => AlreadyExists,
    forbidden => Forbidden,
    contention => Contention,
    internal => Internal,
}

sourced_constructors! {
    configuration, configuration_with_source => Configuration,
    authentication, authentication_with_source => Authentication,
    database, database_with_source => Database,
    cache, cache_with_source => Cache,
    infrastructure, infrastructure_with_source => Infrastructure,
}

impl Error {
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic(message.into().into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Caused by the request rather than by a failing dependency
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. }
                | Self::NotFound { .. }
                | Self::AlreadyExists { .. }
                | Self::Forbidden { .. }
                | Self::Authentication { .. }
        )
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Self::generic(message)
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Self::generic(message)
    }
}
