use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::patient::Patient;
use super::practitioner::Practitioner;

/// A booking transaction between a patient and a practitioner.
///
/// `patient_data` and `practitioner_data` are independent copies taken at
/// booking time — editing the source records afterwards never changes a
/// historical appointment. After creation only the three state flags may
/// change; they are independent booleans, not a status enum, and
/// combinations such as cancelled+paid are representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub practitioner_id: Uuid,
    pub slot_date: String,
    pub slot_time: String,
    pub patient_data: Patient,
    pub practitioner_data: Practitioner,
    pub amount: f64,
    pub booked_at: DateTime<Utc>,
    pub cancelled: bool,
    pub paid: bool,
    pub completed: bool,
}

impl Appointment {
    /// New appointment in its initial state: all flags false, amount copied
    /// from the practitioner's fee at booking time.
    pub fn new(
        patient: &Patient,
        practitioner: &Practitioner,
        slot_date: &str,
        slot_time: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            practitioner_id: practitioner.id,
            slot_date: slot_date.to_string(),
            slot_time: slot_time.to_string(),
            patient_data: patient.clone(),
            practitioner_data: practitioner.clone(),
            amount: practitioner.fee,
            booked_at: Utc::now(),
            cancelled: false,
            paid: false,
            completed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Address;

    fn fixtures() -> (Patient, Practitioner) {
        let patient = Patient::new("Ana", "ana@example.com", "h1");
        let practitioner = Practitioner::new(
            "Dr. Varga",
            "varga@example.com",
            "h2",
            "/avatars/varga.png",
            "Dermatology",
            "MD",
            "8 years",
            "Skin specialist",
            150.0,
            Address::default(),
        );
        (patient, practitioner)
    }

    #[test]
    fn new_appointment_starts_with_all_flags_false() {
        let (patient, practitioner) = fixtures();
        let appt = Appointment::new(&patient, &practitioner, "1_1_2025", "10:00");
        assert!(!appt.cancelled);
        assert!(!appt.paid);
        assert!(!appt.completed);
        assert_eq!(appt.amount, 150.0);
    }

    #[test]
    fn snapshot_is_independent_of_source_record() {
        let (mut patient, practitioner) = fixtures();
        let appt = Appointment::new(&patient, &practitioner, "1_1_2025", "10:00");
        patient.name = "Renamed".to_string();
        assert_eq!(appt.patient_data.name, "Ana");
    }

    #[test]
    fn cancelled_and_paid_can_coexist() {
        let (patient, practitioner) = fixtures();
        let mut appt = Appointment::new(&patient, &practitioner, "1_1_2025", "10:00");
        appt.cancelled = true;
        appt.paid = true;
        let json = serde_json::to_string(&appt).unwrap();
        let back: Appointment = serde_json::from_str(&json).unwrap();
        assert!(back.cancelled && back.paid);
    }
}
