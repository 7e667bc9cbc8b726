use clap::Subcommand;

/// Distribution commands.
#[derive(Clone, Debug, Subcommand)]
pub enum DistributionCommands {
    /// Place an appeal on a session's docket under a member.
    Assign {
        #[arg(long)]
        appeal: String,
        #[arg(long)]
        session: String,
        #[arg(long)]
        member: String,
    },
    /// Active distribution of an appeal.
    Current {
        #[arg(long)]
        appeal: String,
    },
    /// Every distribution snapshot of an appeal, in order.
    History {
        #[arg(long)]
        appeal: String,
    },
}
