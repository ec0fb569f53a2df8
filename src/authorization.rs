//! Ownership policy for acting on an appointment.
//!
//! One policy function used uniformly by cancel/complete instead of
//! repeating the ownership comparison in every handler. Default-deny:
//! a patient may only act on their own appointments, a practitioner only
//! on appointments booked with them, and the admin bypasses the check.

use uuid::Uuid;

use crate::models::ActorRole;

/// May `actor_id` acting as `role` operate on an appointment owned by
/// (`patient_ref`, `practitioner_ref`)?
pub fn can_act(
    actor_id: Option<&Uuid>,
    role: &ActorRole,
    patient_ref: &Uuid,
    practitioner_ref: &Uuid,
) -> bool {
    match role {
        ActorRole::Admin => true,
        ActorRole::Patient => actor_id == Some(patient_ref),
        ActorRole::Practitioner => actor_id == Some(practitioner_ref),
    }
}
