//! Row conversion helpers shared by the query modules.

use std::{fmt::Display, str::FromStr};

use jiff::Timestamp;
use rusqlite::{params, types::Type, Connection, Row};

use crate::error::{DatabaseResultExt, Result};

const CHECK_TASK_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?1)";

fn conversion_failure(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message)),
    )
}

/// Reads a text column holding an RFC 3339 timestamp.
pub(super) fn timestamp_at(row: &Row, idx: usize) -> rusqlite::Result<Timestamp> {
    row.get::<_, String>(idx)?
        .parse::<Timestamp>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Reads a nullable timestamp column.
pub(super) fn optional_timestamp_at(row: &Row, idx: usize) -> rusqlite::Result<Option<Timestamp>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => raw
            .parse::<Timestamp>()
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        None => Ok(None),
    }
}

/// Reads a text column through the type's `FromStr` impl.
pub(super) fn parsed_at<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| conversion_failure(idx, e.to_string()))
}

/// Reads an INTEGER id column.
pub(super) fn id_at(row: &Row, idx: usize) -> rusqlite::Result<u64> {
    Ok(row.get::<_, i64>(idx)? as u64)
}

/// Reads a nullable non-negative INTEGER column.
pub(super) fn optional_u32_at(row: &Row, idx: usize) -> rusqlite::Result<Option<u32>> {
    Ok(row.get::<_, Option<i64>>(idx)?.map(|value| value.max(0) as u32))
}

pub(super) fn optional_timestamp_str(value: Option<Timestamp>) -> Option<String> {
    value.map(|timestamp| timestamp.to_string())
}

pub(super) fn task_exists(connection: &Connection, id: u64) -> Result<bool> {
    connection
        .query_row(CHECK_TASK_EXISTS_SQL, params![id as i64], |row| row.get(0))
        .db_context("Failed to check task existence")
}
