use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Avatar shown until a profile picture is uploaded.
pub const DEFAULT_AVATAR_URL: &str = "/avatars/default.png";

/// Two-line postal address embedded in patient and practitioner profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub line2: String,
}

/// A registered patient. Never hard-deleted.
///
/// The credential hash is stored but never serialized — appointment
/// snapshots and API responses must not leak it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub credential_hash: String,
    pub image: String,
    pub phone: String,
    pub address: Address,
    pub gender: String,
    pub dob: String,
    pub registered_at: DateTime<Utc>,
}

impl Patient {
    /// New patient with registration defaults; profile fields are filled
    /// in later through a profile update.
    pub fn new(name: &str, email: &str, credential_hash: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            credential_hash: credential_hash.to_string(),
            image: DEFAULT_AVATAR_URL.to_string(),
            phone: "000000000".to_string(),
            address: Address::default(),
            gender: "Not Selected".to_string(),
            dob: "Not Selected".to_string(),
            registered_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_patient_has_registration_defaults() {
        let p = Patient::new("Ana", "ana@example.com", "hash");
        assert_eq!(p.phone, "000000000");
        assert_eq!(p.gender, "Not Selected");
        assert_eq!(p.dob, "Not Selected");
        assert_eq!(p.image, DEFAULT_AVATAR_URL);
    }

    #[test]
    fn credential_hash_never_serialized() {
        let p = Patient::new("Ana", "ana@example.com", "secret-hash");
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("credential_hash"));
    }

    #[test]
    fn deserializes_without_credential_hash() {
        let p = Patient::new("Ana", "ana@example.com", "secret-hash");
        let json = serde_json::to_string(&p).unwrap();
        let back: Patient = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, p.id);
        assert!(back.credential_hash.is_empty());
    }
}
