use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

use super::parse_timestamp;

const APPOINTMENT_COLUMNS: &str = "id, patient_id, practitioner_id, slot_date, slot_time,
         patient_data, practitioner_data, amount, booked_at, cancelled, paid, completed";

pub fn insert_appointment(
    conn: &Connection,
    appointment: &Appointment,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, patient_id, practitioner_id, slot_date, slot_time,
         patient_data, practitioner_data, amount, booked_at, cancelled, paid, completed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            appointment.id.to_string(),
            appointment.patient_id.to_string(),
            appointment.practitioner_id.to_string(),
            appointment.slot_date,
            appointment.slot_time,
            serde_json::to_string(&appointment.patient_data)?,
            serde_json::to_string(&appointment.practitioner_data)?,
            appointment.amount,
            appointment.booked_at.to_rfc3339(),
            appointment.cancelled as i32,
            appointment.paid as i32,
            appointment.completed as i32,
        ],
    )?;
    Ok(())
}

pub fn get_appointment(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"
    ))?;

    let result = stmt.query_row(params![id.to_string()], appointment_row);
    match result {
        Ok(row) => Ok(Some(appointment_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Flip one of the three independent state flags. The other columns are
/// immutable after creation, so there is deliberately no general update.
pub fn set_cancelled(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE appointments SET cancelled = 1 WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(())
}

pub fn set_paid(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE appointments SET paid = 1 WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(())
}

pub fn set_completed(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE appointments SET completed = 1 WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(())
}

/// A patient's appointments in insertion order.
pub fn list_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE patient_id = ?1 ORDER BY rowid"
    ))?;
    let rows = stmt.query_map(params![patient_id.to_string()], appointment_row)?;
    collect_appointments(rows)
}

/// A practitioner's appointments in insertion order.
pub fn list_by_practitioner(
    conn: &Connection,
    practitioner_id: &Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE practitioner_id = ?1 ORDER BY rowid"
    ))?;
    let rows = stmt.query_map(params![practitioner_id.to_string()], appointment_row)?;
    collect_appointments(rows)
}

/// Every appointment in insertion order.
pub fn list_all(conn: &Connection) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments ORDER BY rowid"
    ))?;
    let rows = stmt.query_map([], appointment_row)?;
    collect_appointments(rows)
}

pub fn count_appointments(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM appointments", [], |row| row.get(0))?;
    Ok(count)
}

// Internal row type: snapshot columns come back as JSON text and are
// decoded outside the rusqlite row callback.
struct AppointmentRow {
    id: String,
    patient_id: String,
    practitioner_id: String,
    slot_date: String,
    slot_time: String,
    patient_data: String,
    practitioner_data: String,
    amount: f64,
    booked_at: String,
    cancelled: i32,
    paid: i32,
    completed: i32,
}

fn appointment_row(row: &rusqlite::Row<'_>) -> Result<AppointmentRow, rusqlite::Error> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        practitioner_id: row.get(2)?,
        slot_date: row.get(3)?,
        slot_time: row.get(4)?,
        patient_data: row.get(5)?,
        practitioner_data: row.get(6)?,
        amount: row.get(7)?,
        booked_at: row.get(8)?,
        cancelled: row.get(9)?,
        paid: row.get(10)?,
        completed: row.get(11)?,
    })
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    Ok(Appointment {
        id: Uuid::parse_str(&row.id).unwrap_or_default(),
        patient_id: Uuid::parse_str(&row.patient_id).unwrap_or_default(),
        practitioner_id: Uuid::parse_str(&row.practitioner_id).unwrap_or_default(),
        slot_date: row.slot_date,
        slot_time: row.slot_time,
        patient_data: serde_json::from_str(&row.patient_data)?,
        practitioner_data: serde_json::from_str(&row.practitioner_data)?,
        amount: row.amount,
        booked_at: parse_timestamp(&row.booked_at),
        cancelled: row.cancelled != 0,
        paid: row.paid != 0,
        completed: row.completed != 0,
    })
}

fn collect_appointments(
    rows: impl Iterator<Item = Result<AppointmentRow, rusqlite::Error>>,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(appointment_from_row(row?)?);
    }
    Ok(appointments)
}
