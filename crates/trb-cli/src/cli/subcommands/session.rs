use clap::Subcommand;

/// Judgment session commands.
#[derive(Clone, Debug, Subcommand)]
pub enum SessionCommands {
    /// Schedule a session.
    Create {
        #[arg(long)]
        title: String,
        /// Session date, YYYY-MM-DD.
        #[arg(long)]
        date: String,
    },
    /// Get a session by ID.
    Get { id: String },
    /// List sessions, latest date first.
    List,
    /// Appearances on a session's docket.
    Docket { id: String },
}
