use clap::Subcommand;

/// Decision catalog commands.
#[derive(Clone, Debug, Subcommand)]
pub enum DecisionCommands {
    /// Add a catalog entry.
    Create {
        /// preliminary, merit, ex-officio
        #[arg(long = "type")]
        decision_type: String,
        #[arg(long)]
        identifier: String,
        #[arg(long)]
        accept_text: Option<String>,
        #[arg(long)]
        reject_text: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
    /// List catalog entries.
    List {
        #[arg(long = "type")]
        decision_type: Option<String>,
    },
    /// Get a catalog entry by ID.
    Get { id: String },
}
