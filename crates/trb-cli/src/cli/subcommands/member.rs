use clap::Subcommand;

/// Board member commands.
#[derive(Clone, Debug, Subcommand)]
pub enum MemberCommands {
    /// Register a member.
    Create {
        #[arg(long)]
        name: String,
        /// rapporteur, reviewer, presiding, voting
        #[arg(long, default_value = "voting")]
        role: String,
    },
    /// List members by name.
    List,
    /// Get a member by ID.
    Get { id: String },
}
