use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::patient::Address;

/// Per-practitioner booked-slot map: calendar-date key → ordered list of
/// time strings already booked on that date. Within one date no time
/// appears more than once. Mutated only through the slot ledger.
pub type SlotMap = BTreeMap<String, Vec<String>>;

/// A practitioner onboarded by the admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Practitioner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub credential_hash: String,
    pub image: String,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub available: bool,
    pub fee: f64,
    pub address: Address,
    #[serde(default)]
    pub slots_booked: SlotMap,
    pub registered_at: DateTime<Utc>,
}

impl Practitioner {
    /// New practitioner: available by default, empty slot map.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        email: &str,
        credential_hash: &str,
        image: &str,
        speciality: &str,
        degree: &str,
        experience: &str,
        about: &str,
        fee: f64,
        address: Address,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            credential_hash: credential_hash.to_string(),
            image: image.to_string(),
            speciality: speciality.to_string(),
            degree: degree.to_string(),
            experience: experience.to_string(),
            about: about.to_string(),
            available: true,
            fee,
            address,
            slots_booked: SlotMap::new(),
            registered_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Practitioner {
        Practitioner::new(
            "Dr. Varga",
            "varga@example.com",
            "hash",
            "/avatars/varga.png",
            "Dermatology",
            "MD",
            "8 years",
            "Skin specialist",
            120.0,
            Address::default(),
        )
    }

    #[test]
    fn new_practitioner_is_available_with_empty_slots() {
        let p = sample();
        assert!(p.available);
        assert!(p.slots_booked.is_empty());
    }

    #[test]
    fn credential_hash_never_serialized() {
        let p = sample();
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("credential_hash"));
    }

    #[test]
    fn slot_map_serializes_as_json_object() {
        let mut p = sample();
        p.slots_booked
            .insert("1_1_2025".to_string(), vec!["10:00".to_string()]);
        let json = serde_json::to_string(&p.slots_booked).unwrap();
        assert_eq!(json, r#"{"1_1_2025":["10:00"]}"#);
    }
}
