use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::AppearanceStatus;

/// Placement of one appeal on one judgment session's docket.
///
/// `view_requested_member_id` is only set while `recused_for_review`, and
/// `diligence_days_deadline` only while `under_inquiry`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SessionAppearance {
    pub id: String,
    pub appeal_id: String,
    pub session_id: String,
    pub status: AppearanceStatus,
    pub view_requested_member_id: Option<String>,
    pub diligence_days_deadline: Option<i64>,
    pub minutes_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
