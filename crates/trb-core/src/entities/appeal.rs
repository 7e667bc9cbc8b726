use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::AppealStatus;

/// A taxpayer's case under adjudication.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Appeal {
    pub id: String,
    pub protocol_number: String,
    pub status: AppealStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
