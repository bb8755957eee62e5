//! Password Hashing Port

use crate::error::Result;

/// Hashes and verifies credentials
///
/// Both operations are CPU-bound; async callers should run them on a
/// blocking thread.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing (PHC) string
    fn hash(&self, password: &str) -> Result<String>;

    /// Verify a plaintext password against a stored hash
    ///
    /// Returns `Ok(false)` on mismatch; errors are reserved for unreadable hashes.
    fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}
