use clap::{Args, Subcommand};

/// Voting commands.
#[derive(Clone, Debug, Subcommand)]
pub enum VotingCommands {
    /// Votings of an appearance with labels and votes.
    List {
        #[arg(long)]
        appearance: String,
    },
    /// Get a voting by ID.
    Get { id: String },
    /// Close a pending voting with its winner and tally.
    Complete(VotingCompleteArgs),
    /// Group any ungrouped votes of an appearance.
    Aggregate {
        #[arg(long)]
        appearance: String,
    },
}

/// Arguments for `trb voting complete`.
#[derive(Clone, Debug, Args)]
pub struct VotingCompleteArgs {
    pub id: String,
    /// Member whose vote prevailed.
    #[arg(long)]
    pub winner: String,
    /// The presiding member's casting vote broke a tie.
    #[arg(long)]
    pub quality_vote: bool,
    #[arg(long)]
    pub quality_vote_member: Option<String>,
    /// Defaults to the winning vote's text.
    #[arg(long)]
    pub final_text: Option<String>,
    #[arg(long, default_value_t = 0)]
    pub total: i64,
    #[arg(long, default_value_t = 0)]
    pub in_favor: i64,
    #[arg(long, default_value_t = 0)]
    pub against: i64,
    #[arg(long, default_value_t = 0)]
    pub abstentions: i64,
}
