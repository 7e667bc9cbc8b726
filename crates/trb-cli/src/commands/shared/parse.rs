use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use trb_db::error::EngineError;

/// Parse a `snake_case` enum value using serde-deserialization.
///
/// Hyphens are accepted in place of underscores. Failures are reported as
/// validation errors so the error envelope carries status 400.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| {
        EngineError::Validation(format!("invalid {field} '{raw}': {error}")).into()
    })
}

pub fn parse_optional_enum<T>(raw: Option<&str>, field: &str) -> anyhow::Result<Option<T>>
where
    T: DeserializeOwned,
{
    raw.map(|value| parse_enum(value, field)).transpose()
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(raw: &str, field: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|error| {
        EngineError::Validation(format!("invalid {field} '{raw}': {error}")).into()
    })
}
