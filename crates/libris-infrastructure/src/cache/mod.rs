//! Cache access
//!
//! Two disciplines share the cache backends, with opposite failure policies:
//!
//! | Module | Entries | On cache failure |
//! |--------|---------|------------------|
//! | [`aside`] | Entity snapshots (`user:<id>`, `book:<id>`, ...) | Treated as a miss (fail open) |
//! | [`sessions`] | Active-Session Markers (`session:<token>`) | Error returned to the caller (fail closed) |
//!
//! [`repositories`] wraps the repository ports with the cache-aside accessor.

pub mod aside;
pub mod keys;
pub mod repositories;
pub mod sessions;

pub use aside::CacheAside;
pub use keys::CacheKey;
pub use repositories::{
    CachedBookRepository, CachedCirculationRepository, CachedIdentityRepository,
    CachedMemberRepository, CachedRoleAssignmentRepository, CachedRoleRepository,
};
pub use sessions::SessionStore;
