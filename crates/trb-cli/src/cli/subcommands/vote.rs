use clap::{Args, Subcommand};

/// Vote commands.
#[derive(Clone, Debug, Subcommand)]
pub enum VoteCommands {
    /// Record a member's vote and group it into its voting.
    Cast(VoteCastArgs),
    /// Votes cast on an appearance.
    List {
        #[arg(long)]
        appearance: String,
    },
    /// Get a vote by ID.
    Get { id: String },
}

/// Arguments for `trb vote cast`.
#[derive(Clone, Debug, Args)]
pub struct VoteCastArgs {
    #[arg(long)]
    pub appearance: String,
    #[arg(long)]
    pub member: String,
    /// knowledge, no-knowledge
    #[arg(long)]
    pub knowledge: String,
    /// rapporteur, reviewer, member (default member)
    #[arg(long)]
    pub role: Option<String>,
    #[arg(long)]
    pub preliminary: Option<String>,
    #[arg(long)]
    pub merit: Option<String>,
    #[arg(long)]
    pub ex_officio: Option<String>,
    #[arg(long)]
    pub text: String,
}
