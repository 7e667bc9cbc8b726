use anyhow::Context;
use trb_core::enums::AppearanceStatus;
use trb_db::requests::appearance::StatusChange;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AppearanceCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `trb appearance`.
pub async fn handle(
    action: &AppearanceCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AppearanceCommands::Status {
            id,
            status,
            view_member,
            diligence_days,
            minutes,
        } => {
            let change = StatusChange {
                status: parse_enum::<AppearanceStatus>(status, "status")?,
                view_requested_member_id: view_member.clone(),
                diligence_days_deadline: *diligence_days,
                minutes_text: minutes.clone(),
            };
            let appearance = ctx
                .service
                .transition_appearance(id, change)
                .await
                .with_context(|| format!("failed to move appearance {id} to {status}"))?;
            output(&appearance, flags.format)
        }
        AppearanceCommands::Get { id } => {
            output(&ctx.service.get_appearance(id).await?, flags.format)
        }
        AppearanceCommands::List { appeal } => {
            output(&ctx.service.list_appearances(appeal).await?, flags.format)
        }
        AppearanceCommands::Judgment { id } => {
            output(&ctx.service.get_judgment(id).await?, flags.format)
        }
    }
}
