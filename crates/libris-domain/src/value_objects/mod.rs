//! Value objects shared across entities and ports

pub mod code;
pub mod page;
pub mod role;

pub use code::SequenceCode;
pub use page::{Page, PageRequest};
pub use role::{RoleName, RoleSet};
