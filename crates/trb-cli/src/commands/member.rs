use trb_core::enums::MemberRole;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::MemberCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `trb member`.
pub async fn handle(
    action: &MemberCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        MemberCommands::Create { name, role } => {
            let role = parse_enum::<MemberRole>(role, "role")?;
            let member = ctx.service.create_member(name, role).await?;
            output(&member, flags.format)
        }
        MemberCommands::List => {
            let members = ctx.service.list_members(ctx.limit(flags)).await?;
            output(&members, flags.format)
        }
        MemberCommands::Get { id } => output(&ctx.service.get_member(id).await?, flags.format),
    }
}
