mod assign;
mod history;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::DistributionCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `trb distribution`.
pub async fn handle(
    action: &DistributionCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        DistributionCommands::Assign {
            appeal,
            session,
            member,
        } => assign::run(appeal, session, member, ctx, flags).await,
        DistributionCommands::Current { appeal } => {
            output(&ctx.service.current_distribution(appeal).await?, flags.format)
        }
        DistributionCommands::History { appeal } => history::run(appeal, ctx, flags).await,
    }
}
