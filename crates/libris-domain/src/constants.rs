//! Domain layer constants
//!
//! Values that are part of the domain model itself. Operational defaults
//! (timeouts, TTLs, pool sizes) live in the infrastructure constants.

// ============================================================================
// ROLE MODEL CONSTANTS
// ============================================================================

/// Role name granting full administrative access
pub const ROLE_ADMIN: &str = "admin";

/// Role name for library staff
pub const ROLE_STAFF: &str = "staff";

/// Role name for ordinary members of the system
pub const ROLE_USER: &str = "user";

/// Separator used by aggregate queries that join role names into one field
pub const ROLE_JOIN_SEPARATOR: char = ',';

// ============================================================================
// CACHE KEY CONSTANTS
// ============================================================================

/// Entity kind for identity snapshots
pub const CACHE_KIND_IDENTITY: &str = "user";

/// Entity kind for role snapshots
pub const CACHE_KIND_ROLE: &str = "role";

/// Entity kind for member snapshots
pub const CACHE_KIND_MEMBER: &str = "member";

/// Entity kind for book snapshots
pub const CACHE_KIND_BOOK: &str = "book";

/// Entity kind for circulation snapshots
pub const CACHE_KIND_CIRCULATION: &str = "circulation";

/// Prefix of Active-Session Marker keys
pub const SESSION_MARKER_PREFIX: &str = "session";

// ============================================================================
// SEQUENTIAL CODE CONSTANTS
// ============================================================================

/// Prefix of generated member codes
pub const MEMBER_CODE_PREFIX: &str = "ID";

/// Prefix of generated book codes
pub const BOOK_CODE_PREFIX: &str = "BK";

/// Prefix of generated circulation codes
pub const CIRCULATION_CODE_PREFIX: &str = "SKL";

/// Minimum digit width of generated codes
pub const CODE_MIN_WIDTH: usize = 3;

// ============================================================================
// PAGINATION CONSTANTS
// ============================================================================

/// Page size for paginated listings
pub const PAGE_SIZE: u32 = 10;
