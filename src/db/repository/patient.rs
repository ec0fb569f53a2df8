use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

use super::{parse_timestamp, unique_or_sqlite};

const PATIENT_COLUMNS: &str = "id, name, email, credential_hash, image, phone,
         address_line1, address_line2, gender, dob, registered_at";

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, name, email, credential_hash, image, phone,
         address_line1, address_line2, gender, dob, registered_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            patient.id.to_string(),
            patient.name,
            patient.email,
            patient.credential_hash,
            patient.image,
            patient.phone,
            patient.address.line1,
            patient.address.line2,
            patient.gender,
            patient.dob,
            patient.registered_at.to_rfc3339(),
        ],
    )
    .map_err(|e| unique_or_sqlite(e, "email already registered"))?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1"
    ))?;

    match stmt.query_row(params![id.to_string()], patient_from_row) {
        Ok(patient) => Ok(Some(patient)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn find_patient_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients WHERE email = ?1 LIMIT 1"
    ))?;

    match stmt.query_row(params![email], patient_from_row) {
        Ok(patient) => Ok(Some(patient)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Update the patient-editable profile fields. The avatar only changes when
/// a new one was uploaded.
pub fn update_patient_profile(
    conn: &Connection,
    id: &Uuid,
    name: &str,
    phone: &str,
    address: &Address,
    dob: &str,
    gender: &str,
    image: Option<&str>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE patients SET name = ?2, phone = ?3, address_line1 = ?4,
         address_line2 = ?5, dob = ?6, gender = ?7 WHERE id = ?1",
        params![
            id.to_string(),
            name,
            phone,
            address.line1,
            address.line2,
            dob,
            gender,
        ],
    )?;

    if let Some(image) = image {
        conn.execute(
            "UPDATE patients SET image = ?2 WHERE id = ?1",
            params![id.to_string(), image],
        )?;
    }
    Ok(())
}

pub fn count_patients(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    Ok(count)
}

fn patient_from_row(row: &rusqlite::Row<'_>) -> Result<Patient, rusqlite::Error> {
    Ok(Patient {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        name: row.get(1)?,
        email: row.get(2)?,
        credential_hash: row.get(3)?,
        image: row.get(4)?,
        phone: row.get(5)?,
        address: Address {
            line1: row.get(6)?,
            line2: row.get(7)?,
        },
        gender: row.get(8)?,
        dob: row.get(9)?,
        registered_at: parse_timestamp(&row.get::<_, String>(10)?),
    })
}
