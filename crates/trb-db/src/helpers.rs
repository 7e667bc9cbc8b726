//! Row-to-entity parsing helpers.
//!
//! Every repo converts `libsql::Row` (column-indexed) into typed entity
//! structs. These helpers isolate the parsing logic and handle the dual
//! datetime format (`SQLite`'s `datetime('now')` vs Rust's `to_rfc3339()`).

use chrono::{DateTime, NaiveDate, Utc};

use trb_core::enums::EntityType;

use crate::error::EngineError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `EngineError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, EngineError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| EngineError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse an optional TEXT column as `Option<DateTime<Utc>>`.
///
/// # Errors
///
/// Returns `EngineError::Query` if a non-empty string cannot be parsed.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, EngineError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Parse a `YYYY-MM-DD` TEXT column.
///
/// # Errors
///
/// Returns `EngineError::Query` if the string is not a calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, EngineError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| EngineError::Query(format!("Failed to parse date '{s}': {e}")))
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all trb-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `EngineError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, EngineError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| EngineError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
/// Use `get::<Option<String>>()` for nullable columns.
///
/// # Errors
///
/// Returns `EngineError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, EngineError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read an INTEGER 0/1 column as `bool`.
///
/// # Errors
///
/// Returns `EngineError` if the column read fails.
pub fn get_bool(row: &libsql::Row, idx: i32) -> Result<bool, EngineError> {
    Ok(row.get::<i64>(idx)? != 0)
}

/// Extract an optional JSON value from a TEXT column.
///
/// # Errors
///
/// Returns `EngineError::Query` if a non-empty string contains invalid JSON.
pub fn parse_optional_json(s: Option<&str>) -> Result<Option<serde_json::Value>, EngineError> {
    match s {
        Some(s) if !s.is_empty() => {
            let val = serde_json::from_str(s)
                .map_err(|e| EngineError::Query(format!("Invalid JSON in column: {e}")))?;
            Ok(Some(val))
        }
        _ => Ok(None),
    }
}

/// Parse a JSON array of ids stored in a TEXT column.
///
/// # Errors
///
/// Returns `EngineError::Query` if the column is not a JSON string array.
pub fn parse_id_list(s: &str) -> Result<Vec<String>, EngineError> {
    serde_json::from_str(s)
        .map_err(|e| EngineError::Query(format!("Invalid id list '{s}': {e}")))
}

/// Map `EntityType` to the corresponding SQL table name.
///
/// Exhaustive: adding a new `EntityType` variant forces updating this.
#[must_use]
pub const fn entity_type_to_table(entity: EntityType) -> &'static str {
    match entity {
        EntityType::Member => "members",
        EntityType::Appeal => "appeals",
        EntityType::JudgmentSession => "judgment_sessions",
        EntityType::Distribution => "distributions",
        EntityType::Appearance => "session_appearances",
        EntityType::Vote => "votes",
        EntityType::Voting => "votings",
        EntityType::Decision => "decisions",
        EntityType::Judgment => "judgments",
        EntityType::Audit => "audit_trail",
    }
}

/// Fail with `NotFound` unless a row with `id` exists in the entity's table.
///
/// # Errors
///
/// Returns `EngineError::NotFound` for a missing row, or the query error.
pub async fn ensure_exists(
    conn: &libsql::Connection,
    entity: EntityType,
    id: &str,
) -> Result<(), EngineError> {
    let table = entity_type_to_table(entity);
    let mut rows = conn
        .query(&format!("SELECT 1 FROM {table} WHERE id = ?1"), [id])
        .await?;
    match rows.next().await? {
        Some(_) => Ok(()),
        None => Err(EngineError::not_found(entity, id)),
    }
}

/// Trim an optional text input, mapping blank strings to `None`.
#[must_use]
pub fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}
