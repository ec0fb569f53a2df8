//! Booking workflow — orchestrates the slot ledger and the appointment
//! store for the book / cancel / complete / payment-confirmation use cases.
//!
//! Appointment state is three independent flags (`cancelled`, `paid`,
//! `completed`), not a status enum; combinations such as cancelled+paid
//! stay representable and are tolerated downstream.

use rusqlite::Connection;
use uuid::Uuid;

use crate::authorization::can_act;
use crate::db::repository::{
    get_appointment, get_patient, get_practitioner, insert_appointment, set_cancelled,
    set_completed, set_paid, update_availability,
};
use crate::db::DatabaseError;
use crate::models::{ActorRole, Appointment};
use crate::slots::{SlotError, SlotLedger};

/// Domain failures surfaced to the boundary layer. Every operation is
/// attempted once; there is no retry policy in this layer.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BookingError {
    #[error("Missing or invalid details: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Unauthorized action")]
    Unauthorized,
    #[error("Slot not available")]
    SlotTaken,
    #[error("Practitioner not available")]
    PractitionerUnavailable,
    #[error("Dependency failure: {0}")]
    Dependency(String),
}

impl From<DatabaseError> for BookingError {
    fn from(err: DatabaseError) -> Self {
        BookingError::Dependency(err.to_string())
    }
}

impl From<SlotError> for BookingError {
    fn from(err: SlotError) -> Self {
        match err {
            SlotError::PractitionerNotFound => BookingError::NotFound("Practitioner"),
            SlotError::PractitionerUnavailable => BookingError::PractitionerUnavailable,
            SlotError::SlotTaken => BookingError::SlotTaken,
            SlotError::Storage(msg) => BookingError::Dependency(msg),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BookingService {
    ledger: SlotLedger,
}

impl BookingService {
    pub fn new(ledger: SlotLedger) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &SlotLedger {
        &self.ledger
    }

    /// Book a slot for a patient: reserve it in the ledger, then persist the
    /// appointment with denormalized snapshots of both parties and the fee
    /// copied as the amount.
    ///
    /// If the appointment insert fails after the slot was reserved, the
    /// reservation stays in place; the inconsistency is logged and the
    /// failure is returned.
    pub fn book(
        &self,
        conn: &Connection,
        patient_id: &Uuid,
        practitioner_id: &Uuid,
        slot_date: &str,
        slot_time: &str,
    ) -> Result<Appointment, BookingError> {
        if slot_date.trim().is_empty() || slot_time.trim().is_empty() {
            return Err(BookingError::Validation(
                "slot date and time are required".into(),
            ));
        }

        self.ledger
            .try_reserve(conn, practitioner_id, slot_date, slot_time)?;

        let patient = get_patient(conn, patient_id)?.ok_or(BookingError::NotFound("Patient"))?;
        // Re-read so the snapshot carries the slot map as reserved.
        let practitioner = get_practitioner(conn, practitioner_id)?
            .ok_or(BookingError::NotFound("Practitioner"))?;

        let appointment = Appointment::new(&patient, &practitioner, slot_date, slot_time);
        if let Err(e) = insert_appointment(conn, &appointment) {
            tracing::warn!(
                practitioner = %practitioner_id,
                slot_date,
                slot_time,
                "slot reserved but appointment insert failed: {e}"
            );
            return Err(e.into());
        }
        Ok(appointment)
    }

    /// Cancel an appointment on behalf of an actor.
    ///
    /// Cancelling is idempotent — a second cancel re-asserts the flag.
    /// Releasing the practitioner's slot is best-effort: a release failure
    /// is logged as a warning and the cancellation still succeeds, since the
    /// appointment-level flag is the authoritative user-facing outcome.
    pub fn cancel(
        &self,
        conn: &Connection,
        appointment_id: &Uuid,
        actor_id: Option<&Uuid>,
        role: &ActorRole,
    ) -> Result<(), BookingError> {
        let appointment = get_appointment(conn, appointment_id)?
            .ok_or(BookingError::NotFound("Appointment"))?;
        if !can_act(actor_id, role, &appointment.patient_id, &appointment.practitioner_id) {
            return Err(BookingError::Unauthorized);
        }

        set_cancelled(conn, appointment_id)?;

        if let Err(e) = self.ledger.release(
            conn,
            &appointment.practitioner_id,
            &appointment.slot_date,
            &appointment.slot_time,
        ) {
            tracing::warn!(
                appointment = %appointment_id,
                practitioner = %appointment.practitioner_id,
                "cancelled, but slot release failed: {e}"
            );
        }
        Ok(())
    }

    /// Mark a visit as completed. Only the practitioner who owns the
    /// appointment may complete it; the ledger is not touched.
    pub fn complete(
        &self,
        conn: &Connection,
        appointment_id: &Uuid,
        practitioner_id: &Uuid,
    ) -> Result<(), BookingError> {
        let appointment = get_appointment(conn, appointment_id)?
            .ok_or(BookingError::NotFound("Appointment"))?;
        if !can_act(
            Some(practitioner_id),
            &ActorRole::Practitioner,
            &appointment.patient_id,
            &appointment.practitioner_id,
        ) {
            return Err(BookingError::Unauthorized);
        }
        set_completed(conn, appointment_id)?;
        Ok(())
    }

    /// Record a successful charge against the appointment.
    ///
    /// Ownership and slot state are not re-validated: authenticity of the
    /// confirmation is delegated to the payment collaborator that reported
    /// the charge.
    pub fn confirm_payment(
        &self,
        conn: &Connection,
        appointment_id: &Uuid,
    ) -> Result<(), BookingError> {
        set_paid(conn, appointment_id)?;
        Ok(())
    }

    /// Toggle whether the practitioner accepts bookings; returns the new
    /// state. No explicit target value — a pure flip of the current one.
    pub fn toggle_availability(
        &self,
        conn: &Connection,
        practitioner_id: &Uuid,
    ) -> Result<bool, BookingError> {
        let practitioner = get_practitioner(conn, practitioner_id)?
            .ok_or(BookingError::NotFound("Practitioner"))?;
        let next = !practitioner.available;
        update_availability(conn, practitioner_id, next)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::{insert_patient, insert_practitioner, list_by_patient};
    use crate::models::{Address, Patient, Practitioner};

    fn seeded(conn: &Connection) -> (Patient, Practitioner, BookingService) {
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
        insert_patient(conn, &patient).unwrap();
        insert_practitioner(conn, &practitioner).unwrap();
        (patient, practitioner, BookingService::new(SlotLedger::new()))
    }

    #[test]
    fn book_reserves_slot_and_persists_appointment() {
        let conn = open_memory_database().unwrap();
        let (patient, practitioner, service) = seeded(&conn);

        let appointment = service
            .book(&conn, &patient.id, &practitioner.id, "1_1_2025", "10:00")
            .unwrap();
        assert_eq!(appointment.amount, 150.0);
        assert_eq!(appointment.patient_data.name, "Ana");

        let loaded = get_practitioner(&conn, &practitioner.id).unwrap().unwrap();
        assert_eq!(loaded.slots_booked["1_1_2025"], vec!["10:00"]);
        assert_eq!(list_by_patient(&conn, &patient.id).unwrap().len(), 1);
    }

    #[test]
    fn book_rejects_unavailable_practitioner() {
        let conn = open_memory_database().unwrap();
        let (patient, practitioner, service) = seeded(&conn);
        update_availability(&conn, &practitioner.id, false).unwrap();

        let result = service.book(&conn, &patient.id, &practitioner.id, "1_1_2025", "10:00");
        assert_eq!(result, Err(BookingError::PractitionerUnavailable));
    }

    #[test]
    fn second_booking_of_same_slot_is_taken() {
        let conn = open_memory_database().unwrap();
        let (patient, practitioner, service) = seeded(&conn);

        service
            .book(&conn, &patient.id, &practitioner.id, "1_1_2025", "10:00")
            .unwrap();
        let second = service.book(&conn, &patient.id, &practitioner.id, "1_1_2025", "10:00");
        assert_eq!(second, Err(BookingError::SlotTaken));
    }

    #[test]
    fn book_requires_slot_fields() {
        let conn = open_memory_database().unwrap();
        let (patient, practitioner, service) = seeded(&conn);

        let result = service.book(&conn, &patient.id, &practitioner.id, "", "10:00");
        assert!(matches!(result, Err(BookingError::Validation(_))));
    }

    #[test]
    fn book_for_unknown_practitioner_is_not_found() {
        let conn = open_memory_database().unwrap();
        let (patient, _, service) = seeded(&conn);

        let result = service.book(&conn, &patient.id, &Uuid::new_v4(), "1_1_2025", "10:00");
        assert_eq!(result, Err(BookingError::NotFound("Practitioner")));
    }

    #[test]
    fn book_for_unknown_patient_leaves_reservation_in_place() {
        // The reservation stays in place when the appointment cannot be
        // persisted after the slot was taken.
        let conn = open_memory_database().unwrap();
        let (_, practitioner, service) = seeded(&conn);

        let result = service.book(&conn, &Uuid::new_v4(), &practitioner.id, "1_1_2025", "10:00");
        assert_eq!(result, Err(BookingError::NotFound("Patient")));

        let loaded = get_practitioner(&conn, &practitioner.id).unwrap().unwrap();
        assert_eq!(loaded.slots_booked["1_1_2025"], vec!["10:00"]);
    }

    #[test]
    fn cancel_by_owner_releases_slot() {
        let conn = open_memory_database().unwrap();
        let (patient, practitioner, service) = seeded(&conn);

        let appointment = service
            .book(&conn, &patient.id, &practitioner.id, "1_1_2025", "10:00")
            .unwrap();
        service
            .cancel(&conn, &appointment.id, Some(&patient.id), &ActorRole::Patient)
            .unwrap();

        let loaded = get_appointment(&conn, &appointment.id).unwrap().unwrap();
        assert!(loaded.cancelled);
        let prac = get_practitioner(&conn, &practitioner.id).unwrap().unwrap();
        assert!(prac.slots_booked["1_1_2025"].is_empty());
    }

    #[test]
    fn cancel_by_other_patient_is_unauthorized() {
        let conn = open_memory_database().unwrap();
        let (patient, practitioner, service) = seeded(&conn);

        let appointment = service
            .book(&conn, &patient.id, &practitioner.id, "1_1_2025", "10:00")
            .unwrap();
        let intruder = Uuid::new_v4();
        let result = service.cancel(&conn, &appointment.id, Some(&intruder), &ActorRole::Patient);
        assert_eq!(result, Err(BookingError::Unauthorized));

        let loaded = get_appointment(&conn, &appointment.id).unwrap().unwrap();
        assert!(!loaded.cancelled);
    }

    #[test]
    fn cancel_twice_is_idempotent() {
        let conn = open_memory_database().unwrap();
        let (patient, practitioner, service) = seeded(&conn);

        let appointment = service
            .book(&conn, &patient.id, &practitioner.id, "1_1_2025", "10:00")
            .unwrap();
        service
            .cancel(&conn, &appointment.id, Some(&patient.id), &ActorRole::Patient)
            .unwrap();
        service
            .cancel(&conn, &appointment.id, Some(&patient.id), &ActorRole::Patient)
            .unwrap();

        let loaded = get_appointment(&conn, &appointment.id).unwrap().unwrap();
        assert!(loaded.cancelled);
    }

    #[test]
    fn cancel_of_missing_appointment_is_not_found() {
        let conn = open_memory_database().unwrap();
        let (_, _, service) = seeded(&conn);

        let result = service.cancel(&conn, &Uuid::new_v4(), None, &ActorRole::Admin);
        assert_eq!(result, Err(BookingError::NotFound("Appointment")));
    }

    #[test]
    fn admin_cancels_without_ownership() {
        let conn = open_memory_database().unwrap();
        let (patient, practitioner, service) = seeded(&conn);

        let appointment = service
            .book(&conn, &patient.id, &practitioner.id, "1_1_2025", "10:00")
            .unwrap();
        service
            .cancel(&conn, &appointment.id, None, &ActorRole::Admin)
            .unwrap();

        let loaded = get_appointment(&conn, &appointment.id).unwrap().unwrap();
        assert!(loaded.cancelled);
    }

    #[test]
    fn complete_requires_owning_practitioner() {
        let conn = open_memory_database().unwrap();
        let (patient, practitioner, service) = seeded(&conn);

        let appointment = service
            .book(&conn, &patient.id, &practitioner.id, "1_1_2025", "10:00")
            .unwrap();

        let other = Uuid::new_v4();
        let result = service.complete(&conn, &appointment.id, &other);
        assert_eq!(result, Err(BookingError::Unauthorized));

        service
            .complete(&conn, &appointment.id, &practitioner.id)
            .unwrap();
        let loaded = get_appointment(&conn, &appointment.id).unwrap().unwrap();
        assert!(loaded.completed);
        // The slot stays booked — completing is not a release.
        let prac = get_practitioner(&conn, &practitioner.id).unwrap().unwrap();
        assert_eq!(prac.slots_booked["1_1_2025"], vec!["10:00"]);
    }

    #[test]
    fn payment_confirmation_sets_paid_without_other_checks() {
        let conn = open_memory_database().unwrap();
        let (patient, practitioner, service) = seeded(&conn);

        let appointment = service
            .book(&conn, &patient.id, &practitioner.id, "1_1_2025", "10:00")
            .unwrap();
        service.confirm_payment(&conn, &appointment.id).unwrap();

        let loaded = get_appointment(&conn, &appointment.id).unwrap().unwrap();
        assert!(loaded.paid);
    }

    #[test]
    fn cancelled_then_paid_is_tolerated() {
        let conn = open_memory_database().unwrap();
        let (patient, practitioner, service) = seeded(&conn);

        let appointment = service
            .book(&conn, &patient.id, &practitioner.id, "1_1_2025", "10:00")
            .unwrap();
        service
            .cancel(&conn, &appointment.id, Some(&patient.id), &ActorRole::Patient)
            .unwrap();
        service.confirm_payment(&conn, &appointment.id).unwrap();

        let loaded = get_appointment(&conn, &appointment.id).unwrap().unwrap();
        assert!(loaded.cancelled && loaded.paid);
    }

    #[test]
    fn availability_toggle_flips_and_reports_new_state() {
        let conn = open_memory_database().unwrap();
        let (_, practitioner, service) = seeded(&conn);

        assert!(!service.toggle_availability(&conn, &practitioner.id).unwrap());
        assert!(service.toggle_availability(&conn, &practitioner.id).unwrap());

        let result = service.toggle_availability(&conn, &Uuid::new_v4());
        assert_eq!(result, Err(BookingError::NotFound("Practitioner")));
    }
}
