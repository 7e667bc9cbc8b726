mod publish;

use trb_core::enums::AppealStatus;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AppealCommands;
use crate::commands::shared::parse::parse_optional_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `trb appeal`.
pub async fn handle(
    action: &AppealCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AppealCommands::Create { protocol } => {
            output(&ctx.service.create_appeal(protocol).await?, flags.format)
        }
        AppealCommands::Get { id } => output(&ctx.service.get_appeal(id).await?, flags.format),
        AppealCommands::List { status } => {
            let status = parse_optional_enum::<AppealStatus>(status.as_deref(), "status")?;
            let appeals = ctx.service.list_appeals(status, ctx.limit(flags)).await?;
            output(&appeals, flags.format)
        }
        AppealCommands::Publish { id } => publish::run(id, ctx, flags).await,
    }
}
