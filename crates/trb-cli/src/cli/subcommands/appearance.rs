use clap::Subcommand;

/// Session appearance commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AppearanceCommands {
    /// Move an appearance to a new status.
    Status {
        id: String,
        /// on-docket, stayed, under-inquiry, recused-for-review, judged
        #[arg(long)]
        status: String,
        /// Member who asked to review the case.
        #[arg(long)]
        view_member: Option<String>,
        /// Inquiry deadline in days.
        #[arg(long)]
        diligence_days: Option<i64>,
        /// Judgment minutes; ignored unless the status is judged.
        #[arg(long)]
        minutes: Option<String>,
    },
    /// Get an appearance by ID.
    Get { id: String },
    /// Appearances of an appeal across sessions.
    List {
        #[arg(long)]
        appeal: String,
    },
    /// Judgment recorded for an appearance.
    Judgment { id: String },
}
