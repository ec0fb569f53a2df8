//! Credential hashing — opaque "hash/verify credential" capability.
//!
//! PBKDF2 password-hash strings (PHC format, random salt). Verification of
//! a malformed stored hash is treated as a mismatch rather than an error so
//! a corrupted row cannot be used to probe the login path.

use pbkdf2::password_hash::rand_core::OsRng;
use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::Pbkdf2;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Credential hashing failed: {0}")]
    Hash(String),
}

/// Hash a plaintext credential into a self-describing PHC string.
pub fn hash_credential(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Pbkdf2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| CredentialError::Hash(e.to_string()))
}

/// Verify a plaintext credential against a stored PHC string.
pub fn verify_credential(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hash = hash_credential("correct horse battery").unwrap();
        assert!(verify_credential("correct horse battery", &hash));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let hash = hash_credential("correct horse battery").unwrap();
        assert!(!verify_credential("wrong password", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let h1 = hash_credential("same input").unwrap();
        let h2 = hash_credential("same input").unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn malformed_stored_hash_is_a_mismatch() {
        assert!(!verify_credential("anything", "not-a-phc-string"));
    }
}
