use trb_core::enums::{AuditAction, EntityType};
use trb_db::repos::audit::AuditFilter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::commands::shared::parse::parse_optional_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `trb audit`.
pub async fn handle(args: &AuditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let filter = AuditFilter {
        entity_type: parse_optional_enum::<EntityType>(args.entity_type.as_deref(), "entity-type")?,
        entity_id: args.entity_id.clone(),
        action: parse_optional_enum::<AuditAction>(args.action.as_deref(), "action")?,
        actor_id: args.actor_id.clone(),
        limit: Some(ctx.limit(flags)),
    };
    output(&ctx.service.query_audit(&filter).await?, flags.format)
}
