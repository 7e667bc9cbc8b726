use anyhow::Context;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Place the appeal on the session's docket; prints the new snapshot and
/// the appearance it opened.
pub async fn run(
    appeal_id: &str,
    session_id: &str,
    member_id: &str,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let placement = ctx
        .service
        .place_on_docket(appeal_id, session_id, member_id)
        .await
        .with_context(|| format!("failed to distribute {appeal_id} in session {session_id}"))?;
    output(&placement, flags.format)
}
