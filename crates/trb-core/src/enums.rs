//! Status enums, vote taxonomy, entity types, and actions for Tribunal.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Status enums with state machines provide `allowed_next_states()` to enforce
//! valid transitions at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// MemberRole
// ---------------------------------------------------------------------------

/// Role a board member holds on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Rapporteur,
    Reviewer,
    Presiding,
    Voting,
}

impl MemberRole {
    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rapporteur => "rapporteur",
            Self::Reviewer => "reviewer",
            Self::Presiding => "presiding",
            Self::Voting => "voting",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AppealStatus
// ---------------------------------------------------------------------------

/// Coarse lifecycle of an appeal, derived from its session appearances.
///
/// ```text
/// filed → in_judgment ⇄ stay_requested
///                     ⇄ under_inquiry
///       → pending_publication → published
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppealStatus {
    Filed,
    InJudgment,
    StayRequested,
    UnderInquiry,
    PendingPublication,
    Published,
}

impl AppealStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Filed => "filed",
            Self::InJudgment => "in_judgment",
            Self::StayRequested => "stay_requested",
            Self::UnderInquiry => "under_inquiry",
            Self::PendingPublication => "pending_publication",
            Self::Published => "published",
        }
    }
}

impl fmt::Display for AppealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AppearanceStatus
// ---------------------------------------------------------------------------

/// Status of an appeal's placement on one judgment session docket.
///
/// Every non-terminal status may move to any status (including itself, to
/// refresh its context fields). `judged` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppearanceStatus {
    OnDocket,
    Stayed,
    UnderInquiry,
    RecusedForReview,
    Judged,
}

impl AppearanceStatus {
    const ALL: [Self; 5] = [
        Self::OnDocket,
        Self::Stayed,
        Self::UnderInquiry,
        Self::RecusedForReview,
        Self::Judged,
    ];

    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::OnDocket | Self::Stayed | Self::UnderInquiry | Self::RecusedForReview => {
                &Self::ALL
            }
            Self::Judged => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Coarse appeal status implied by an appearance entering this status.
    #[must_use]
    pub const fn appeal_status(self) -> AppealStatus {
        match self {
            Self::OnDocket | Self::RecusedForReview => AppealStatus::InJudgment,
            Self::Stayed => AppealStatus::StayRequested,
            Self::UnderInquiry => AppealStatus::UnderInquiry,
            Self::Judged => AppealStatus::PendingPublication,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnDocket => "on_docket",
            Self::Stayed => "stayed",
            Self::UnderInquiry => "under_inquiry",
            Self::RecusedForReview => "recused_for_review",
            Self::Judged => "judged",
        }
    }
}

impl fmt::Display for AppearanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// KnowledgeType
// ---------------------------------------------------------------------------

/// Whether the panel proceeds to the merits or dismisses on preliminary grounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeType {
    NoKnowledge,
    Knowledge,
}

impl KnowledgeType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoKnowledge => "no_knowledge",
            Self::Knowledge => "knowledge",
        }
    }

    /// The voting type votes of this knowledge type aggregate into.
    #[must_use]
    pub const fn voting_type(self) -> VotingType {
        match self {
            Self::NoKnowledge => VotingType::NoKnowledge,
            Self::Knowledge => VotingType::Merit,
        }
    }
}

impl fmt::Display for KnowledgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// VoteRole
// ---------------------------------------------------------------------------

/// Capacity in which a member casts a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VoteRole {
    Rapporteur,
    Reviewer,
    Member,
}

impl VoteRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rapporteur => "rapporteur",
            Self::Reviewer => "reviewer",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for VoteRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// VotingType
// ---------------------------------------------------------------------------

/// Kind of collective decision a voting resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VotingType {
    NoKnowledge,
    Merit,
}

impl VotingType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoKnowledge => "no_knowledge",
            Self::Merit => "merit",
        }
    }
}

impl fmt::Display for VotingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// VotingStatus
// ---------------------------------------------------------------------------

/// Status of a voting.
///
/// ```text
/// pending → closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VotingStatus {
    Pending,
    Closed,
}

impl VotingStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Closed],
            Self::Closed => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for VotingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DecisionType
// ---------------------------------------------------------------------------

/// Branch of the decision catalog an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    Preliminary,
    Merit,
    ExOfficio,
}

impl DecisionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preliminary => "preliminary",
            Self::Merit => "merit",
            Self::ExOfficio => "ex_officio",
        }
    }
}

impl fmt::Display for DecisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Type of action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    StatusChanged,
    Distributed,
    ReviewerAdded,
    Grouped,
    Closed,
    Published,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::StatusChanged => "status_changed",
            Self::Distributed => "distributed",
            Self::ReviewerAdded => "reviewer_added",
            Self::Grouped => "grouped",
            Self::Closed => "closed",
            Self::Published => "published",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Type of entity in the system, used in the audit trail and error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Member,
    Appeal,
    JudgmentSession,
    Distribution,
    Appearance,
    Vote,
    Voting,
    Decision,
    Judgment,
    Audit,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Appeal => "appeal",
            Self::JudgmentSession => "judgment_session",
            Self::Distribution => "distribution",
            Self::Appearance => "appearance",
            Self::Vote => "vote",
            Self::Voting => "voting",
            Self::Decision => "decision",
            Self::Judgment => "judgment",
            Self::Audit => "audit",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TrailOp
// ---------------------------------------------------------------------------

/// Operation type recorded in JSONL trail files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrailOp {
    Create,
    Supersede,
    Group,
    Close,
    Transition,
}

impl TrailOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Supersede => "supersede",
            Self::Group => "group",
            Self::Close => "close",
            Self::Transition => "transition",
        }
    }
}

impl fmt::Display for TrailOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
