use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A sitting of the board with its own docket.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct JudgmentSession {
    pub id: String,
    pub title: String,
    pub scheduled_for: NaiveDate,
    pub created_at: DateTime<Utc>,
}
