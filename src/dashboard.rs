//! Read-only dashboard aggregation for the admin and practitioner views.
//!
//! Latest-first listings are the exact reverse of insertion order — the
//! repositories return insertion order and the views flip it, without
//! sorting by the booked-at timestamp.

use std::collections::HashSet;

use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use crate::db::repository::{
    count_appointments, count_patients, count_practitioners, list_all, list_by_practitioner,
};
use crate::db::DatabaseError;
use crate::models::Appointment;

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub practitioners: i64,
    pub patients: i64,
    pub appointments: i64,
    pub latest_appointments: Vec<Appointment>,
}

#[derive(Debug, Serialize)]
pub struct PractitionerDashboard {
    pub earnings: f64,
    pub appointments: i64,
    pub patients: i64,
    pub latest_appointments: Vec<Appointment>,
}

pub fn admin_dashboard(conn: &Connection) -> Result<AdminDashboard, DatabaseError> {
    let mut appointments = list_all(conn)?;
    appointments.reverse();

    Ok(AdminDashboard {
        practitioners: count_practitioners(conn)?,
        patients: count_patients(conn)?,
        appointments: count_appointments(conn)?,
        latest_appointments: appointments,
    })
}

/// Earnings count each appointment once when it is completed or paid;
/// an appointment carrying both flags is still a single sum term.
pub fn practitioner_dashboard(
    conn: &Connection,
    practitioner_id: &Uuid,
) -> Result<PractitionerDashboard, DatabaseError> {
    let mut appointments = list_by_practitioner(conn, practitioner_id)?;

    let mut earnings = 0.0;
    let mut unique_patients: HashSet<Uuid> = HashSet::new();
    for appointment in &appointments {
        if appointment.completed || appointment.paid {
            earnings += appointment.amount;
        }
        unique_patients.insert(appointment.patient_id);
    }

    let total = appointments.len() as i64;
    appointments.reverse();

    Ok(PractitionerDashboard {
        earnings,
        appointments: total,
        patients: unique_patients.len() as i64,
        latest_appointments: appointments,
    })
}
