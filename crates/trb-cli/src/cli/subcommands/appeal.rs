use clap::Subcommand;

/// Appeal commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AppealCommands {
    /// File an appeal.
    Create {
        #[arg(long)]
        protocol: String,
    },
    /// Get an appeal by ID.
    Get { id: String },
    /// List appeals, newest first.
    List {
        #[arg(long)]
        status: Option<String>,
    },
    /// Publish the decision of a judged appeal.
    Publish { id: String },
}
