//! Vote request builder.

use serde::{Deserialize, Serialize};

use trb_core::enums::{KnowledgeType, VoteRole};
use trb_core::grouping::VotingKey;

use crate::error::EngineError;

/// A member's vote on an appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVote {
    pub appearance_id: String,
    pub member_id: String,
    pub vote_role: VoteRole,
    pub knowledge_type: KnowledgeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preliminary_decision_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merit_decision_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ex_officio_decision_id: Option<String>,
    pub text: String,
}

impl NewVote {
    #[must_use]
    pub fn builder(
        appearance_id: impl Into<String>,
        member_id: impl Into<String>,
        knowledge_type: KnowledgeType,
    ) -> NewVoteBuilder {
        NewVoteBuilder(Self {
            appearance_id: appearance_id.into(),
            member_id: member_id.into(),
            vote_role: VoteRole::Member,
            knowledge_type,
            preliminary_decision_id: None,
            merit_decision_id: None,
            ex_officio_decision_id: None,
            text: String::new(),
        })
    }

    /// Key of the voting this vote will be grouped into.
    #[must_use]
    pub fn voting_key(&self) -> VotingKey {
        VotingKey::for_vote(self.knowledge_type, self.preliminary_decision_id.as_deref())
    }

    /// Shape checks that need no database access.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` for blank ids or text, and for a
    /// knowledge vote without a merit decision.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.appearance_id.trim().is_empty() {
            return Err(EngineError::Validation("appearance_id is required".into()));
        }
        if self.member_id.trim().is_empty() {
            return Err(EngineError::Validation("member_id is required".into()));
        }
        if self.text.trim().is_empty() {
            return Err(EngineError::Validation("vote text must not be empty".into()));
        }
        if self.knowledge_type == KnowledgeType::Knowledge && self.merit_decision_id.is_none() {
            return Err(EngineError::Validation(
                "a knowledge vote requires merit_decision_id".into(),
            ));
        }
        Ok(())
    }
}

pub struct NewVoteBuilder(NewVote);

impl NewVoteBuilder {
    #[must_use]
    pub fn role(mut self, val: VoteRole) -> Self {
        self.0.vote_role = val;
        self
    }

    #[must_use]
    pub fn preliminary(mut self, val: Option<String>) -> Self {
        self.0.preliminary_decision_id = val.filter(|id| !id.trim().is_empty());
        self
    }

    #[must_use]
    pub fn merit(mut self, val: Option<String>) -> Self {
        self.0.merit_decision_id = val.filter(|id| !id.trim().is_empty());
        self
    }

    #[must_use]
    pub fn ex_officio(mut self, val: Option<String>) -> Self {
        self.0.ex_officio_decision_id = val.filter(|id| !id.trim().is_empty());
        self
    }

    #[must_use]
    pub fn text(mut self, val: impl Into<String>) -> Self {
        self.0.text = val.into();
        self
    }

    #[must_use]
    pub fn build(self) -> NewVote {
        self.0
    }
}
