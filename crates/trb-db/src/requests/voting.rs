//! Voting close request builder.

use serde::{Deserialize, Serialize};

use trb_core::tally::Tally;

/// Outcome announced by the chair when a voting concludes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseVoting {
    pub winning_member_id: String,
    pub quality_vote_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_vote_member_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_text: Option<String>,
    pub tally: Tally,
}

impl CloseVoting {
    #[must_use]
    pub fn builder(winning_member_id: impl Into<String>) -> CloseVotingBuilder {
        CloseVotingBuilder(Self {
            winning_member_id: winning_member_id.into(),
            quality_vote_used: false,
            quality_vote_member_id: None,
            final_text: None,
            tally: Tally::default(),
        })
    }
}

pub struct CloseVotingBuilder(CloseVoting);

impl CloseVotingBuilder {
    /// Record that `member_id` broke a tie with the casting vote.
    #[must_use]
    pub fn quality_vote(mut self, member_id: impl Into<String>) -> Self {
        self.0.quality_vote_used = true;
        self.0.quality_vote_member_id = Some(member_id.into());
        self
    }

    /// Set the flag and member independently, as received from a caller.
    #[must_use]
    pub fn quality_vote_raw(mut self, used: bool, member_id: Option<String>) -> Self {
        self.0.quality_vote_used = used;
        self.0.quality_vote_member_id = member_id;
        self
    }

    #[must_use]
    pub fn final_text(mut self, val: impl Into<String>) -> Self {
        self.0.final_text = Some(val.into());
        self
    }

    #[must_use]
    pub const fn tally(mut self, val: Tally) -> Self {
        self.0.tally = val;
        self
    }

    #[must_use]
    pub fn build(self) -> CloseVoting {
        self.0
    }
}
