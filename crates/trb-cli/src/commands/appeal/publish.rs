use anyhow::Context;
use serde::Serialize;
use trb_core::entities::{Appeal, Judgment};

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct PublishResponse {
    appeal: Appeal,
    judgments: Vec<Judgment>,
}

/// Publish the decision and print the judgments it covers.
pub async fn run(appeal_id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let appeal = ctx
        .service
        .publish_decision(appeal_id)
        .await
        .with_context(|| format!("failed to publish decision of {appeal_id}"))?;

    let mut judgments = Vec::new();
    for appearance in ctx.service.list_appearances(appeal_id).await? {
        if let Some(judgment) = ctx.service.get_judgment(&appearance.id).await? {
            judgments.push(judgment);
        }
    }
    output(&PublishResponse { appeal, judgments }, flags.format)
}
