use serde::Serialize;
use trb_core::entities::{JudgmentSession, SessionAppearance};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SessionCommands;
use crate::commands::shared::parse::parse_date;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct DocketResponse {
    session: JudgmentSession,
    appearances: Vec<SessionAppearance>,
}

/// Handle `trb session`.
pub async fn handle(
    action: &SessionCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        SessionCommands::Create { title, date } => {
            let scheduled_for = parse_date(date, "date")?;
            let session = ctx
                .service
                .create_judgment_session(title, scheduled_for)
                .await?;
            output(&session, flags.format)
        }
        SessionCommands::Get { id } => {
            output(&ctx.service.get_judgment_session(id).await?, flags.format)
        }
        SessionCommands::List => {
            let sessions = ctx.service.list_judgment_sessions(ctx.limit(flags)).await?;
            output(&sessions, flags.format)
        }
        SessionCommands::Docket { id } => {
            let session = ctx.service.get_judgment_session(id).await?;
            let appearances = ctx.service.session_docket(id).await?;
            output(
                &DocketResponse {
                    session,
                    appearances,
                },
                flags.format,
            )
        }
    }
}
