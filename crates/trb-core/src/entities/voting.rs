use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{VotingStatus, VotingType};
use crate::grouping::{GroupKey, VotingKey};
use crate::tally::Tally;

/// Collective decision unit grouping votes of identical shape.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Voting {
    pub id: String,
    pub appearance_id: String,
    pub voting_type: VotingType,
    pub preliminary_decision_id: Option<String>,
    pub status: VotingStatus,
    pub winning_vote_id: Option<String>,
    pub winning_member_id: Option<String>,
    pub quality_vote_used: bool,
    pub quality_vote_member_id: Option<String>,
    pub final_text: Option<String>,
    pub total_votes: i64,
    pub votes_in_favor: i64,
    pub votes_against: i64,
    pub abstentions: i64,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Voting {
    #[must_use]
    pub fn key(&self) -> VotingKey {
        VotingKey {
            voting_type: self.voting_type,
            group: GroupKey::from_preliminary(self.preliminary_decision_id.as_deref()),
        }
    }

    #[must_use]
    pub const fn tally(&self) -> Tally {
        Tally::new(
            self.total_votes,
            self.votes_in_favor,
            self.votes_against,
            self.abstentions,
        )
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.status == VotingStatus::Closed
    }
}
