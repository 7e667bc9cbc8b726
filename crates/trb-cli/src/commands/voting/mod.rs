mod complete;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::VotingCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `trb voting`.
pub async fn handle(
    action: &VotingCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        VotingCommands::List { appearance } => {
            output(&ctx.service.list_votings(appearance).await?, flags.format)
        }
        VotingCommands::Get { id } => output(&ctx.service.get_voting(id).await?, flags.format),
        VotingCommands::Complete(args) => complete::run(args, ctx, flags).await,
        VotingCommands::Aggregate { appearance } => {
            output(&ctx.service.aggregate(appearance).await?, flags.format)
        }
    }
}
