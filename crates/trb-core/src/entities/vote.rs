use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{KnowledgeType, VoteRole};
use crate::grouping::VotingKey;

/// One member's individually cast position on an appearance.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Vote {
    pub id: String,
    pub appearance_id: String,
    pub member_id: String,
    pub vote_role: VoteRole,
    pub knowledge_type: KnowledgeType,
    pub preliminary_decision_id: Option<String>,
    pub merit_decision_id: Option<String>,
    pub ex_officio_decision_id: Option<String>,
    pub text: String,
    pub voting_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    /// Identity of the voting this vote aggregates into.
    #[must_use]
    pub fn voting_key(&self) -> VotingKey {
        VotingKey::for_vote(self.knowledge_type, self.preliminary_decision_id.as_deref())
    }

    #[must_use]
    pub const fn is_grouped(&self) -> bool {
        self.voting_id.is_some()
    }
}
