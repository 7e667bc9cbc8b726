use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    AppealCommands, AppearanceCommands, DecisionCommands, DistributionCommands, MemberCommands,
    SessionCommands, VoteCommands, VotingCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Board members.
    Member {
        #[command(subcommand)]
        action: MemberCommands,
    },
    /// Decision catalog (preliminaries, merits, ex officio matters).
    Decision {
        #[command(subcommand)]
        action: DecisionCommands,
    },
    /// Appeals.
    Appeal {
        #[command(subcommand)]
        action: AppealCommands,
    },
    /// Judgment sessions.
    Session {
        #[command(subcommand)]
        action: SessionCommands,
    },
    /// Distribution snapshots and docket placement.
    Distribution {
        #[command(subcommand)]
        action: DistributionCommands,
    },
    /// Session appearances.
    Appearance {
        #[command(subcommand)]
        action: AppearanceCommands,
    },
    /// Individual votes.
    Vote {
        #[command(subcommand)]
        action: VoteCommands,
    },
    /// Votings and their resolution.
    Voting {
        #[command(subcommand)]
        action: VotingCommands,
    },
    /// View audit trail.
    Audit(AuditArgs),
}

/// Arguments for `trb audit`.
#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    #[arg(long)]
    pub entity_type: Option<String>,
    #[arg(long)]
    pub entity_id: Option<String>,
    #[arg(long)]
    pub action: Option<String>,
    /// Member recorded as the actor.
    #[arg(long = "by")]
    pub actor_id: Option<String>,
}
