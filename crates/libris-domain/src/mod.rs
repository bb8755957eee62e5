//! Libris domain layer
//!
//! Entities, the role model, port traits and the shared error type.
//! Nothing in this crate performs I/O; providers and infrastructure
//! implement the ports declared under [`ports`].

pub mod constants;
pub mod entities;
pub mod error;
pub mod ports;
pub mod repositories;
pub mod value_objects;

pub use entities::{Book, Circulation, Credentials, Identity, Member, Role};
pub use error::{Error, Result};
pub use value_objects::{RoleName, RoleSet};
