//! Password hashing providers

pub mod password;

pub use password::Argon2PasswordHasher;
