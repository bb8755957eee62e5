//! Repository Interfaces
//!
//! Durable-store contracts. Every implementation is authoritative; the
//! cache-aside decorators in the infrastructure crate wrap these same
//! traits, so callers never know whether a cache sits in front.
//!
//! ## Repositories
//!
//! | Repository | Description |
//! |------------|-------------|
//! | [`IdentityRepository`] | Identities, credentials and `token_version` |
//! | [`RoleRepository`] | Role records |
//! | [`RoleAssignmentRepository`] | Identity to role relation |
//! | [`MemberRepository`] | Library members with generated codes |
//! | [`BookRepository`] | Catalogued books with generated codes |
//! | [`CirculationRepository`] | Loans of books to members |

/// Book repository interface
pub mod book_repository;
/// Circulation repository interface
pub mod circulation_repository;
/// Identity repository interface
pub mod identity_repository;
/// Member repository interface
pub mod member_repository;
/// Role and role assignment repository interfaces
pub mod role_repository;

// Re-export repository interfaces
pub use book_repository::BookRepository;
pub use circulation_repository::CirculationRepository;
pub use identity_repository::IdentityRepository;
pub use member_repository::MemberRepository;
pub use role_repository::{RoleAssignmentRepository, RoleRepository};
