//! Slot ledger — decides whether a (practitioner, date, time) slot is
//! bookable and reflects reservation/release in the practitioner's
//! booked-slot map.
//!
//! Presence is checked by exact string equality against the entries already
//! stored under the date key; "10:00" and "10:00 AM" are distinct slots.
//!
//! Two reservation guards:
//! - `ReadModifyWrite` (default): fetch the practitioner, inspect the map,
//!   write the whole map back. The sequence is not one atomic storage
//!   operation, so two concurrent reservations for the same slot can both
//!   observe it free before either writes.
//! - `UniqueIndex`: a `slot_reservations` row keyed by
//!   (practitioner, date, time) gates the reservation; the storage layer's
//!   uniqueness constraint turns the second concurrent insert into a
//!   conflict. The map is still maintained for reads.

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::repository::{get_practitioner, update_slot_map};
use crate::db::DatabaseError;

/// How reservations are protected against concurrent double-booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReservationGuard {
    /// Check-then-act over the whole slot map.
    #[default]
    ReadModifyWrite,
    /// Uniqueness constraint on (practitioner, date, time) reservation rows.
    UniqueIndex,
}

/// Outcome of a failed reservation attempt.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SlotError {
    #[error("Practitioner not found")]
    PractitionerNotFound,
    #[error("Practitioner not available")]
    PractitionerUnavailable,
    #[error("Slot not available")]
    SlotTaken,
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<DatabaseError> for SlotError {
    fn from(err: DatabaseError) -> Self {
        SlotError::Storage(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SlotLedger {
    guard: ReservationGuard,
}

impl SlotLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger that routes reservations through the uniqueness constraint.
    pub fn with_unique_guard() -> Self {
        Self {
            guard: ReservationGuard::UniqueIndex,
        }
    }

    pub fn guard(&self) -> ReservationGuard {
        self.guard
    }

    /// Reserve a slot for the practitioner.
    ///
    /// The practitioner must exist and be accepting bookings. On success the
    /// time is appended to the date's entry (creating it if absent) and the
    /// updated map is persisted.
    pub fn try_reserve(
        &self,
        conn: &Connection,
        practitioner_id: &Uuid,
        date: &str,
        time: &str,
    ) -> Result<(), SlotError> {
        let mut practitioner = get_practitioner(conn, practitioner_id)?
            .ok_or(SlotError::PractitionerNotFound)?;
        if !practitioner.available {
            return Err(SlotError::PractitionerUnavailable);
        }

        if self.guard == ReservationGuard::UniqueIndex {
            self.insert_reservation_row(conn, practitioner_id, date, time)?;
        }

        let slots = practitioner
            .slots_booked
            .entry(date.to_string())
            .or_default();
        if self.guard == ReservationGuard::ReadModifyWrite
            && slots.iter().any(|t| t == time)
        {
            return Err(SlotError::SlotTaken);
        }
        if !slots.iter().any(|t| t == time) {
            slots.push(time.to_string());
        }
        update_slot_map(conn, practitioner_id, &practitioner.slots_booked)?;
        Ok(())
    }

    /// Release a slot. Removes the first (and only) occurrence of the time
    /// from the date's entry and persists. A missing practitioner, date or
    /// time is a no-op that still reports success — a patient-facing
    /// cancellation must never fail here.
    pub fn release(
        &self,
        conn: &Connection,
        practitioner_id: &Uuid,
        date: &str,
        time: &str,
    ) -> Result<(), SlotError> {
        if self.guard == ReservationGuard::UniqueIndex {
            conn.execute(
                "DELETE FROM slot_reservations
                 WHERE practitioner_id = ?1 AND slot_date = ?2 AND slot_time = ?3",
                params![practitioner_id.to_string(), date, time],
            )
            .map_err(DatabaseError::from)?;
        }

        let Some(mut practitioner) = get_practitioner(conn, practitioner_id)? else {
            return Ok(());
        };
        let Some(slots) = practitioner.slots_booked.get_mut(date) else {
            return Ok(());
        };
        if let Some(pos) = slots.iter().position(|t| t == time) {
            slots.remove(pos);
            update_slot_map(conn, practitioner_id, &practitioner.slots_booked)?;
        }
        Ok(())
    }

    /// Gate a reservation on inserting its uniqueness row; a constraint
    /// failure means another booking already holds the slot.
    fn insert_reservation_row(
        &self,
        conn: &Connection,
        practitioner_id: &Uuid,
        date: &str,
        time: &str,
    ) -> Result<(), SlotError> {
        let result = conn.execute(
            "INSERT INTO slot_reservations (practitioner_id, slot_date, slot_time)
             VALUES (?1, ?2, ?3)",
            params![practitioner_id.to_string(), date, time],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(f, _))
                if f.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(SlotError::SlotTaken)
            }
            Err(e) => Err(DatabaseError::from(e).into()),
        }
    }
}
