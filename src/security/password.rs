//! Access password hashing and verification.
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$...`), so the algorithm,
//! version, parameters and salt travel with the stored value.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(argon2::password_hash::Error),
}

#[cfg(not(test))]
fn hasher() -> Argon2<'static> {
    Argon2::default()
}

// Unit tests only need a valid hash, not an expensive one.
#[cfg(test)]
fn hasher() -> Argon2<'static> {
    let params = argon2::Params::new(1024, 1, 1, None).unwrap_or_default();
    Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params)
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hash)
}

/// Verify a password against a stored hash. Malformed or empty hashes never match.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    if stored_hash.is_empty() {
        return false;
    }
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_versioned() {
        let first = hash_password("open sesame").unwrap();
        let second = hash_password("open sesame").unwrap();
        assert!(first.starts_with("$argon2id$v=19$"));
        assert_ne!(first, second);
        assert!(!first.contains("open sesame"));
    }

    #[test]
    fn verifies_matching_password_only() {
        let hash = hash_password("open sesame").unwrap();
        assert!(verify_password("open sesame", &hash));
        assert!(!verify_password("open sesame!", &hash));
        assert!(!verify_password("", &hash));
    }

    #[test]
    fn rejects_empty_or_garbage_hash() {
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
