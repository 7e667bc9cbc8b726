use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Final record of an appearance's merit outcome.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Judgment {
    pub id: String,
    pub appearance_id: String,
    pub voting_id: String,
    pub minutes_text: Option<String>,
    pub created_at: DateTime<Utc>,
}
