use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Immutable snapshot of who is responsible for an appeal.
///
/// A new snapshot supersedes the previous one each time the appeal is placed
/// on a docket or accrues a reviewer; only `is_active` ever changes on an
/// existing record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Distribution {
    pub id: String,
    pub appeal_id: String,
    pub session_id: String,
    pub rapporteur_id: String,
    pub distributed_to_id: String,
    pub reviewer_ids: Vec<String>,
    pub order: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Distribution {
    #[must_use]
    pub fn has_reviewer(&self, member_id: &str) -> bool {
        self.reviewer_ids.iter().any(|id| id == member_id)
    }
}
