//! Response types returned as JSON by the `trb` request surface.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Distribution, SessionAppearance, Vote, Voting};

/// Response from `trb distribution assign`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PlacementResponse {
    pub distribution: Distribution,
    pub appearance: SessionAppearance,
}

/// A vote with the catalog identifiers of the decisions it references.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct VoteView {
    #[serde(flatten)]
    pub vote: Vote,
    pub member_name: String,
    pub preliminary_identifier: Option<String>,
    pub merit_identifier: Option<String>,
    pub ex_officio_identifier: Option<String>,
}

/// A voting with its label and nested votes, as listed per appearance.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct VotingView {
    #[serde(flatten)]
    pub voting: Voting,
    pub label: String,
    pub votes: Vec<VoteView>,
}

/// Outcome of one aggregation pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AggregationReport {
    pub votings_created: u32,
    pub votes_grouped: u32,
}

impl AggregationReport {
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.votings_created == 0 && self.votes_grouped == 0
    }
}

/// Error envelope printed when a request fails.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ErrorResponse {
    pub kind: String,
    pub status: u16,
    pub message: String,
}
