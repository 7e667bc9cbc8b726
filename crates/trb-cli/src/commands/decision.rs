use trb_core::enums::DecisionType;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::DecisionCommands;
use crate::commands::shared::parse::{parse_enum, parse_optional_enum};
use crate::context::AppContext;
use crate::output::output;

/// Handle `trb decision`.
pub async fn handle(
    action: &DecisionCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        DecisionCommands::Create {
            decision_type,
            identifier,
            accept_text,
            reject_text,
            body,
        } => {
            let decision_type = parse_enum::<DecisionType>(decision_type, "type")?;
            let decision = ctx
                .service
                .create_decision(
                    decision_type,
                    identifier,
                    accept_text.as_deref(),
                    reject_text.as_deref(),
                    body.as_deref(),
                )
                .await?;
            output(&decision, flags.format)
        }
        DecisionCommands::List { decision_type } => {
            let decision_type =
                parse_optional_enum::<DecisionType>(decision_type.as_deref(), "type")?;
            output(&ctx.service.list_decisions(decision_type).await?, flags.format)
        }
        DecisionCommands::Get { id } => output(&ctx.service.get_decision(id).await?, flags.format),
    }
}
