//! Engine error types for trb-db.
//!
//! Every failure carries an [`ErrorKind`] so the request surface can report
//! it with the right status: validation and state conflicts are the caller's
//! to fix (400), missing records are 404, and broken engine invariants are
//! 400 with a specific code the caller can explain to the user.

use thiserror::Error;

use trb_core::enums::EntityType;
use trb_core::errors::CoreError;
use trb_core::responses::ErrorResponse;

/// Coarse classification of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Invariant,
    Internal,
}

impl ErrorKind {
    /// HTTP-style status code for the kind.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Validation | Self::Conflict | Self::Invariant => 400,
            Self::NotFound => 404,
            Self::Internal => 500,
        }
    }
}

/// Errors from engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A required field is missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityType, id: String },

    #[error("Voting not found: {0}")]
    VotingNotFound(String),

    #[error("Appeal {appeal_id} is already on the docket of session {session_id}")]
    AlreadyOnDocket {
        appeal_id: String,
        session_id: String,
    },

    #[error("Member {member_id} already cast this vote on appearance {appearance_id}")]
    DuplicateVote {
        member_id: String,
        appearance_id: String,
    },

    #[error("Voting {0} is already closed")]
    AlreadyClosed(String),

    #[error("Appearance {0} is already judged")]
    AppearanceJudged(String),

    #[error("Invalid state transition: {entity} {id} from {from} to {to}")]
    InvalidTransition {
        entity: EntityType,
        id: String,
        from: String,
        to: String,
    },

    #[error("Member {member_id} cast no vote in voting {voting_id}")]
    WinnerNotAParticipant {
        voting_id: String,
        member_id: String,
    },

    #[error("Appearance {0} has no closed merit voting")]
    NoMeritVoting(String),

    #[error("Member {member_id} is the rapporteur of appeal {appeal_id} and cannot vote as reviewer")]
    RapporteurCannotReview { member_id: String, appeal_id: String },

    #[error("Quality vote used but the tally is not tied ({in_favor} in favor, {against} against)")]
    QualityVoteWithoutTie { in_favor: i64, against: i64 },

    /// A concurrent writer won a uniqueness race. Safe to retry.
    #[error("Write conflict: {0}")]
    WriteConflict(String),

    /// A SQL query failed or returned malformed data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } | Self::VotingNotFound(_) => ErrorKind::NotFound,
            Self::AlreadyOnDocket { .. }
            | Self::DuplicateVote { .. }
            | Self::AlreadyClosed(_)
            | Self::AppearanceJudged(_)
            | Self::InvalidTransition { .. } => ErrorKind::Conflict,
            Self::WinnerNotAParticipant { .. }
            | Self::NoMeritVoting(_)
            | Self::RapporteurCannotReview { .. }
            | Self::QualityVoteWithoutTie { .. } => ErrorKind::Invariant,
            Self::WriteConflict(_)
            | Self::Query(_)
            | Self::Migration(_)
            | Self::NoResult
            | Self::LibSql(_)
            | Self::Other(_) => ErrorKind::Internal,
        }
    }

    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Stable machine-readable code, one per variant.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound { .. } => "not_found",
            Self::VotingNotFound(_) => "voting_not_found",
            Self::AlreadyOnDocket { .. } => "already_on_docket",
            Self::DuplicateVote { .. } => "duplicate_vote",
            Self::AlreadyClosed(_) => "already_closed",
            Self::AppearanceJudged(_) => "appearance_judged",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::WinnerNotAParticipant { .. } => "winner_not_a_participant",
            Self::NoMeritVoting(_) => "no_merit_voting",
            Self::RapporteurCannotReview { .. } => "rapporteur_cannot_review",
            Self::QualityVoteWithoutTie { .. } => "quality_vote_without_tie",
            Self::WriteConflict(_) => "write_conflict",
            Self::Query(_) | Self::NoResult => "query",
            Self::Migration(_) => "migration",
            Self::LibSql(_) | Self::Other(_) => "internal",
        }
    }

    /// Whether repeating the operation may succeed without caller changes.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::WriteConflict(_) => true,
            Self::LibSql(e) => crate::retry::is_busy_error(e),
            _ => false,
        }
    }

    #[must_use]
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            kind: self.code().to_string(),
            status: self.status_code(),
            message: self.to_string(),
        }
    }

    pub(crate) fn not_found(entity: EntityType, id: &str) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn json(e: serde_json::Error) -> Self {
        Self::Other(e.into())
    }
}

impl From<CoreError> for EngineError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::QualityVoteWithoutTie { in_favor, against } => {
                Self::QualityVoteWithoutTie { in_favor, against }
            }
        }
    }
}

/// Whether a libSQL error is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(e: &libsql::Error) -> bool {
    e.to_string().contains("UNIQUE constraint failed")
}
