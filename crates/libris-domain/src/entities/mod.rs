//! Domain entities

pub mod book;
pub mod circulation;
pub mod identity;
pub mod member;
pub mod role;

pub use book::{Book, BookPatch, NewBook};
pub use circulation::{Circulation, CirculationPatch, CirculationReturn, NewCirculation};
pub use identity::{Credentials, Identity, IdentityPatch, NewIdentity};
pub use member::{Gender, Member, MemberPatch, NewMember};
pub use role::Role;
