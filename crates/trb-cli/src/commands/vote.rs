use anyhow::Context;
use trb_core::enums::{KnowledgeType, VoteRole};
use trb_db::requests::vote::NewVote;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{VoteCastArgs, VoteCommands};
use crate::commands::shared::parse::{parse_enum, parse_optional_enum};
use crate::context::AppContext;
use crate::output::output;

/// Handle `trb vote`.
pub async fn handle(action: &VoteCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        VoteCommands::Cast(args) => cast(args, ctx, flags).await,
        VoteCommands::List { appearance } => {
            output(&ctx.service.list_votes(appearance).await?, flags.format)
        }
        VoteCommands::Get { id } => output(&ctx.service.get_vote(id).await?, flags.format),
    }
}

fn build_vote(args: &VoteCastArgs) -> anyhow::Result<NewVote> {
    let knowledge = parse_enum::<KnowledgeType>(&args.knowledge, "knowledge")?;
    let role = parse_optional_enum::<VoteRole>(args.role.as_deref(), "role")?.unwrap_or(VoteRole::Member);
    Ok(NewVote::builder(&args.appearance, &args.member, knowledge)
        .role(role)
        .preliminary(args.preliminary.clone())
        .merit(args.merit.clone())
        .ex_officio(args.ex_officio.clone())
        .text(&args.text)
        .build())
}

async fn cast(args: &VoteCastArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let vote = build_vote(args)?;
    let vote = ctx
        .service
        .record_vote(vote)
        .await
        .with_context(|| format!("failed to record vote of {} on {}", args.member, args.appearance))?;
    output(&vote, flags.format)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use trb_core::grouping::GroupKey;

    use super::*;

    fn args(knowledge: &str, role: Option<&str>) -> VoteCastArgs {
        VoteCastArgs {
            appearance: "apr-1".into(),
            member: "mem-1".into(),
            knowledge: knowledge.into(),
            role: role.map(String::from),
            preliminary: Some("dec-1".into()),
            merit: None,
            ex_officio: Some("  ".into()),
            text: "Não conheço.".into(),
        }
    }

    #[test]
    fn builds_vote_with_default_role() {
        let vote = build_vote(&args("no-knowledge", None)).unwrap();
        assert_eq!(vote.vote_role, VoteRole::Member);
        assert_eq!(vote.knowledge_type, KnowledgeType::NoKnowledge);
        assert_eq!(vote.ex_officio_decision_id, None);
        assert_eq!(vote.voting_key().group, GroupKey::Preliminary("dec-1".into()));
    }

    #[test]
    fn rejects_unknown_role() {
        assert!(build_vote(&args("knowledge", Some("clerk"))).is_err());
    }
}
