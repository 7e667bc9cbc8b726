//! Typed audit detail payloads.
//!
//! Each audit action can carry a structured `detail` JSON blob. These types
//! provide schema validation for the detail shapes the engine writes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Detail for `AuditAction::StatusChanged`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusChangedDetail {
    pub from: String,
    pub to: String,
    pub reason: Option<String>,
}

/// Detail for `AuditAction::Distributed` and `AuditAction::ReviewerAdded`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DistributionDetail {
    pub appeal_id: String,
    pub superseded_id: Option<String>,
    pub rapporteur_id: String,
    pub distributed_to_id: String,
    pub reviewer_ids: Vec<String>,
}

/// Detail for `AuditAction::Grouped`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GroupedDetail {
    pub voting_id: String,
    pub vote_ids: Vec<String>,
    pub created: bool,
}

/// Detail for `AuditAction::Closed`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct VotingClosedDetail {
    pub winning_member_id: String,
    pub winning_vote_id: String,
    pub quality_vote_member_id: Option<String>,
}
