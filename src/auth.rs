//! Bearer-token authentication — opaque "verify principal, extract subject
//! id" capability.
//!
//! Tokens are 32 bytes of entropy, URL-safe base64, handed to the client
//! once and stored server-side only as SHA-256 hashes mapped to the
//! principal they authenticate.

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::ActorRole;

/// Who a verified token speaks for.
///
/// `subject` is `None` only for the env-credentialed admin, which has no
/// identity record of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub subject: Option<Uuid>,
    pub role: ActorRole,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AuthError {
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Forbidden for this role")]
    Forbidden,
}

impl Principal {
    pub fn patient(id: Uuid) -> Self {
        Self {
            subject: Some(id),
            role: ActorRole::Patient,
        }
    }

    pub fn practitioner(id: Uuid) -> Self {
        Self {
            subject: Some(id),
            role: ActorRole::Practitioner,
        }
    }

    pub fn admin() -> Self {
        Self {
            subject: None,
            role: ActorRole::Admin,
        }
    }

    /// The subject id, provided the principal carries the expected role.
    pub fn actor_id(&self, role: ActorRole) -> Result<Uuid, AuthError> {
        if self.role != role {
            return Err(AuthError::Forbidden);
        }
        self.subject.ok_or(AuthError::Forbidden)
    }

    pub fn require_admin(&self) -> Result<(), AuthError> {
        if self.role == ActorRole::Admin {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

/// In-memory token registry: SHA-256 token hash → principal.
#[derive(Debug, Default)]
pub struct TokenStore {
    tokens: HashMap<[u8; 32], Principal>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh bearer token for the principal. The raw token is
    /// returned exactly once; only its hash is retained.
    pub fn issue(&mut self, principal: Principal) -> String {
        let token = generate_token();
        self.tokens.insert(hash_token(&token), principal);
        token
    }

    /// Resolve a presented token to its principal.
    pub fn verify(&self, token: &str) -> Option<Principal> {
        self.tokens.get(&hash_token(token)).cloned()
    }
}

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_to_its_principal() {
        let mut store = TokenStore::new();
        let id = Uuid::new_v4();
        let token = store.issue(Principal::patient(id));

        let principal = store.verify(&token).unwrap();
        assert_eq!(principal.subject, Some(id));
        assert_eq!(principal.role, ActorRole::Patient);
    }

    #[test]
    fn unknown_token_does_not_verify() {
        let store = TokenStore::new();
        assert!(store.verify("made-up-token").is_none());
    }

    #[test]
    fn generate_token_is_unique() {
        let t1 = generate_token();
        let t2 = generate_token();
        assert_ne!(t1, t2);
        assert!(!t1.is_empty());
    }

    #[test]
    fn hash_token_is_deterministic() {
        assert_eq!(hash_token("test"), hash_token("test"));
        assert_ne!(hash_token("token-a"), hash_token("token-b"));
    }

    #[test]
    fn actor_id_enforces_role() {
        let id = Uuid::new_v4();
        let principal = Principal::patient(id);
        assert_eq!(principal.actor_id(ActorRole::Patient), Ok(id));
        assert_eq!(
            principal.actor_id(ActorRole::Practitioner),
            Err(AuthError::Forbidden)
        );
    }

    #[test]
    fn admin_has_no_subject_but_passes_admin_check() {
        let principal = Principal::admin();
        assert!(principal.require_admin().is_ok());
        assert_eq!(
            principal.actor_id(ActorRole::Admin),
            Err(AuthError::Forbidden)
        );

        let patient = Principal::patient(Uuid::new_v4());
        assert_eq!(patient.require_admin(), Err(AuthError::Forbidden));
    }
}
