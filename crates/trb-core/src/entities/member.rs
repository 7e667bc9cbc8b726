use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::MemberRole;

/// A board participant. Long-lived; referenced by distributions and votes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub role: MemberRole,
    pub created_at: DateTime<Utc>,
}
