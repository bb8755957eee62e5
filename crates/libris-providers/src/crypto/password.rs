//! Password hashing with Argon2id and bcrypt migration support
//!
//! New hashes are Argon2id PHC strings. Verification auto-detects the
//! algorithm so accounts imported with bcrypt hashes keep working.

use crate::constants::{ARGON2_HASH_PREFIX, BCRYPT_HASH_PREFIX};
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use libris_domain::error::{Error, Result};
use libris_domain::ports::providers::PasswordHasher;

/// Argon2id password hasher
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    /// Create a hasher with the default Argon2id parameters
    pub fn new() -> Self {
        Self
    }

    fn verify_argon2(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| Error::authentication(format!("Invalid hash format: {e}")))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn verify_bcrypt(password: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(password, hash)
            .map_err(|e| Error::authentication_with_source("Password verification failed", e))
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| Error::internal(format!("Password hashing failed: {e}")))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        if hash.is_empty() {
            return Ok(false);
        }

        if hash.starts_with(ARGON2_HASH_PREFIX) {
            Self::verify_argon2(password, hash)
        } else if hash.starts_with(BCRYPT_HASH_PREFIX) {
            Self::verify_bcrypt(password, hash)
        } else {
            Err(Error::authentication("Unknown password hash format"))
        }
    }
}
