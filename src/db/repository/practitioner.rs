use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

use super::{parse_timestamp, unique_or_sqlite};

const PRACTITIONER_COLUMNS: &str = "id, name, email, credential_hash, image, speciality,
         degree, experience, about, available, fee, address_line1, address_line2,
         slots_booked, registered_at";

pub fn insert_practitioner(
    conn: &Connection,
    practitioner: &Practitioner,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO practitioners (id, name, email, credential_hash, image, speciality,
         degree, experience, about, available, fee, address_line1, address_line2,
         slots_booked, registered_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            practitioner.id.to_string(),
            practitioner.name,
            practitioner.email,
            practitioner.credential_hash,
            practitioner.image,
            practitioner.speciality,
            practitioner.degree,
            practitioner.experience,
            practitioner.about,
            practitioner.available as i32,
            practitioner.fee,
            practitioner.address.line1,
            practitioner.address.line2,
            serde_json::to_string(&practitioner.slots_booked)?,
            practitioner.registered_at.to_rfc3339(),
        ],
    )
    .map_err(|e| unique_or_sqlite(e, "email already registered"))?;
    Ok(())
}

pub fn get_practitioner(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Practitioner>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRACTITIONER_COLUMNS} FROM practitioners WHERE id = ?1"
    ))?;

    match stmt.query_row(params![id.to_string()], practitioner_from_row) {
        Ok(practitioner) => Ok(Some(practitioner)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn find_practitioner_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<Practitioner>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRACTITIONER_COLUMNS} FROM practitioners WHERE email = ?1 LIMIT 1"
    ))?;

    match stmt.query_row(params![email], practitioner_from_row) {
        Ok(practitioner) => Ok(Some(practitioner)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All practitioners in insertion order.
pub fn list_practitioners(conn: &Connection) -> Result<Vec<Practitioner>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRACTITIONER_COLUMNS} FROM practitioners ORDER BY rowid"
    ))?;

    let rows = stmt.query_map([], practitioner_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Persist the whole booked-slot map back onto the practitioner row.
pub fn update_slot_map(
    conn: &Connection,
    id: &Uuid,
    slots: &SlotMap,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE practitioners SET slots_booked = ?2 WHERE id = ?1",
        params![id.to_string(), serde_json::to_string(slots)?],
    )?;
    Ok(())
}

pub fn update_availability(
    conn: &Connection,
    id: &Uuid,
    available: bool,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE practitioners SET available = ?2 WHERE id = ?1",
        params![id.to_string(), available as i32],
    )?;
    Ok(())
}

/// Update the practitioner-editable profile fields.
pub fn update_practitioner_profile(
    conn: &Connection,
    id: &Uuid,
    fee: f64,
    address: &Address,
    available: bool,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE practitioners SET fee = ?2, address_line1 = ?3, address_line2 = ?4,
         available = ?5 WHERE id = ?1",
        params![
            id.to_string(),
            fee,
            address.line1,
            address.line2,
            available as i32,
        ],
    )?;
    Ok(())
}

pub fn count_practitioners(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM practitioners", [], |row| row.get(0))?;
    Ok(count)
}

fn practitioner_from_row(row: &rusqlite::Row<'_>) -> Result<Practitioner, rusqlite::Error> {
    let slots_json: String = row.get(13)?;
    Ok(Practitioner {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        name: row.get(1)?,
        email: row.get(2)?,
        credential_hash: row.get(3)?,
        image: row.get(4)?,
        speciality: row.get(5)?,
        degree: row.get(6)?,
        experience: row.get(7)?,
        about: row.get(8)?,
        available: row.get::<_, i32>(9)? != 0,
        fee: row.get(10)?,
        address: Address {
            line1: row.get(11)?,
            line2: row.get(12)?,
        },
        slots_booked: serde_json::from_str(&slots_json).unwrap_or_default(),
        registered_at: parse_timestamp(&row.get::<_, String>(14)?),
    })
}
