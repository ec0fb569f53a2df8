pub mod appointment;
pub mod patient;
pub mod practitioner;

pub use appointment::*;
pub use patient::*;
pub use practitioner::*;

use chrono::{DateTime, Utc};

use super::DatabaseError;

/// Map a UNIQUE-constraint failure onto a readable error; other SQLite
/// errors pass through unchanged.
pub(crate) fn unique_or_sqlite(err: rusqlite::Error, what: &str) -> DatabaseError {
    match err {
        rusqlite::Error::SqliteFailure(f, _)
            if f.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DatabaseError::ConstraintViolation(what.to_string())
        }
        other => other.into(),
    }
}

/// Parse a stored RFC 3339 timestamp, falling back to the epoch for
/// values written by hand in fixtures.
pub(crate) fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_default()
}
