//! Argon2 password hashing for seeded accounts.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hashes a password into an Argon2id PHC string with a random salt.
pub fn hash_password(password: &str) -> Result<String> {
    // ---
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("Failed to hash password: {e}"))
}

/// Checks a password against a stored PHC string.
///
/// A wrong password is `Ok(false)`; a malformed hash is an error.
pub fn verify_password(password: &str, hashed: &str) -> Result<bool> {
    // ---
    let parsed = PasswordHash::new(hashed).map_err(|e| anyhow!("Malformed password hash: {e}"))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("Password verification failed: {e}")),
    }
}
