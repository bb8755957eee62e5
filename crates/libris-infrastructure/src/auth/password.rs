//! Password hashing off the async runtime

use crate::error_ext::join_error;
use libris_domain::error::Result;
use libris_domain::ports::providers::PasswordHasher;
use std::sync::Arc;

/// Hash `password` on a blocking thread
pub async fn hash_password(hasher: &Arc<dyn PasswordHasher>, password: &str) -> Result<String> {
    let hasher = Arc::clone(hasher);
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| join_error(e, "Password hashing task failed"))?
}

/// Verify `password` against `hash` on a blocking thread
pub async fn verify_password(
    hasher: &Arc<dyn PasswordHasher>,
    password: &str,
    hash: &str,
) -> Result<bool> {
    let hasher = Arc::clone(hasher);
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .map_err(|e| join_error(e, "Password verification task failed"))?
}
