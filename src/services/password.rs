//! Password hashing
//!
//! Argon2id with the crate's secure defaults and a random salt per hash.
//! Hashes are stored in PHC string format, so parameters travel with the
//! hash and can be upgraded later without a migration.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
        .context("Password hashing failed")?;

    Ok(password_hash.to_string())
}

/// Verify a password against a stored PHC-format hash.
///
/// Returns `Ok(false)` on a wrong password; errors only when the stored
/// hash itself is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))
        .context("Failed to parse password hash")?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("Password verification failed: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_produces_argon2id() {
        let hash = hash_password("test_password_123").expect("Failed to hash");
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_same_password_different_hashes() {
        let hash1 = hash_password("same_password").expect("Failed to hash");
        let hash2 = hash_password("same_password").expect("Failed to hash");
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_round_trip() {
        let hash = hash_password("correct_password").expect("Failed to hash");

        assert!(verify_password("correct_password", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_invalid_hash_is_error() {
        assert!(verify_password("password", "not_a_phc_string").is_err());
    }

    #[test]
    fn test_unicode_password() {
        let password = "pässwörd🔐";
        let hash = hash_password(password).expect("Failed to hash");
        assert!(verify_password(password, &hash).unwrap());
    }
}
