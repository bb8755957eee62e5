//! Application services
//!
//! Thin orchestration over the (cached) repositories. Every mutation goes
//! through a repository decorator, so cache invalidation happens there and
//! not here. Services add the checks that need more than one lookup:
//! uniqueness of human-facing fields and admin self-protection.

pub mod catalog;
pub mod roles;
pub mod users;

pub use catalog::{BookService, CirculationService, MemberService};
pub use roles::RoleService;
pub use users::{NewUser, UserChanges, UserService};
