use anyhow::Context;
use trb_core::tally::Tally;
use trb_db::requests::voting::CloseVoting;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::VotingCompleteArgs;
use crate::context::AppContext;
use crate::output::output;

fn build_request(args: &VotingCompleteArgs) -> CloseVoting {
    let builder = CloseVoting::builder(&args.winner)
        .quality_vote_raw(args.quality_vote, args.quality_vote_member.clone())
        .tally(Tally::new(args.total, args.in_favor, args.against, args.abstentions));
    let builder = match &args.final_text {
        Some(text) => builder.final_text(text),
        None => builder,
    };
    builder.build()
}

pub async fn run(args: &VotingCompleteArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let voting = ctx
        .service
        .close_voting(&args.id, build_request(args))
        .await
        .with_context(|| format!("failed to close voting {}", args.id))?;
    output(&voting, flags.format)
}
