//! Authentication and authorization core
//!
//! | Component | Role |
//! |-----------|------|
//! | [`TokenIssuer`] | Signs HS256 session tokens and registers their Active-Session Marker |
//! | [`TokenValidator`] | Ordered, fail-closed validation under a deadline |
//! | [`RoleGate`] | Fresh role lookup against a fixed permitted set; admin self-protection |
//! | [`SessionRevocation`] | Logout (marker delete) and logout everywhere (version bump) |
//! | [`Authenticator`] | Credential check and registration |
//!
//! A request flows validator -> gate -> handler. Both resolve the identity
//! through the cache-aside accessor.

pub mod claims;
pub mod error;
pub mod gate;
pub mod issuer;
pub mod keys;
pub mod password;
pub mod revocation;
pub mod service;
pub mod validator;

pub use claims::Claims;
pub use error::{AuthError, AuthFailureKind};
pub use gate::{ADMIN_ONLY, ANY_ROLE, RoleGate, STAFF_OR_ADMIN};
pub use issuer::{IssuedToken, TokenIssuer};
pub use keys::SigningKeys;
pub use revocation::SessionRevocation;
pub use service::Authenticator;
pub use validator::{Principal, TokenValidator, bearer_token};
