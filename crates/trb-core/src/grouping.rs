//! Voting grouping keys and display labels.
//!
//! Votes are grouped by `(voting type, preliminary decision)`. "No preliminary
//! decision" is a key of its own (`GroupKey::Bare`), never a missing value, so
//! two bare non-knowledge votes always share a voting and never share one with
//! a vote that names a preliminary decision.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::enums::{KnowledgeType, VotingType};
use crate::errors::CoreError;

/// Label of a non-knowledge voting.
pub const LABEL_NO_KNOWLEDGE: &str = "Não Conhecimento";

/// Label of a merit voting.
pub const LABEL_MERIT: &str = "Mérito";

const STORAGE_BARE: &str = "bare";
const STORAGE_PRELIMINARY_PREFIX: &str = "preliminary:";

/// Preliminary-decision component of a grouping key.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(tag = "kind", content = "decision_id", rename_all = "snake_case")]
pub enum GroupKey {
    /// No preliminary decision was named.
    Bare,
    /// Grouped under a concrete preliminary decision.
    Preliminary(String),
}

impl GroupKey {
    #[must_use]
    pub fn from_preliminary(decision_id: Option<&str>) -> Self {
        match decision_id {
            Some(id) if !id.is_empty() => Self::Preliminary(id.to_string()),
            _ => Self::Bare,
        }
    }

    #[must_use]
    pub fn preliminary_decision_id(&self) -> Option<&str> {
        match self {
            Self::Bare => None,
            Self::Preliminary(id) => Some(id),
        }
    }

    /// Non-null column value used by the unique indexes.
    #[must_use]
    pub fn storage_key(&self) -> String {
        match self {
            Self::Bare => STORAGE_BARE.to_string(),
            Self::Preliminary(id) => format!("{STORAGE_PRELIMINARY_PREFIX}{id}"),
        }
    }

    /// Parse a value produced by [`GroupKey::storage_key`].
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for anything else.
    pub fn from_storage(raw: &str) -> Result<Self, CoreError> {
        if raw == STORAGE_BARE {
            return Ok(Self::Bare);
        }
        match raw.strip_prefix(STORAGE_PRELIMINARY_PREFIX) {
            Some(id) if !id.is_empty() => Ok(Self::Preliminary(id.to_string())),
            _ => Err(CoreError::Validation(format!("unknown group key '{raw}'"))),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}

/// Full identity of the voting a vote belongs to.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct VotingKey {
    pub voting_type: VotingType,
    pub group: GroupKey,
}

impl VotingKey {
    /// Key for a vote. Knowledge votes all collapse into the single merit key.
    #[must_use]
    pub fn for_vote(knowledge_type: KnowledgeType, preliminary_decision_id: Option<&str>) -> Self {
        match knowledge_type {
            KnowledgeType::Knowledge => Self::merit(),
            KnowledgeType::NoKnowledge => Self {
                voting_type: VotingType::NoKnowledge,
                group: GroupKey::from_preliminary(preliminary_decision_id),
            },
        }
    }

    #[must_use]
    pub const fn merit() -> Self {
        Self {
            voting_type: VotingType::Merit,
            group: GroupKey::Bare,
        }
    }
}

/// Display label of a voting.
///
/// `preliminary_identifier` is the catalog identifier of the voting's
/// preliminary decision, when it has one.
#[must_use]
pub fn voting_label(voting_type: VotingType, preliminary_identifier: Option<&str>) -> String {
    match (voting_type, preliminary_identifier) {
        (VotingType::Merit, _) => LABEL_MERIT.to_string(),
        (VotingType::NoKnowledge, Some(identifier)) => {
            format!("{LABEL_NO_KNOWLEDGE} - {identifier}")
        }
        (VotingType::NoKnowledge, None) => LABEL_NO_KNOWLEDGE.to_string(),
    }
}
