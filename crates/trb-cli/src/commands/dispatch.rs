use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Member { action } => commands::member::handle(&action, ctx, flags).await,
        Commands::Decision { action } => commands::decision::handle(&action, ctx, flags).await,
        Commands::Appeal { action } => commands::appeal::handle(&action, ctx, flags).await,
        Commands::Session { action } => commands::session::handle(&action, ctx, flags).await,
        Commands::Distribution { action } => {
            commands::distribution::handle(&action, ctx, flags).await
        }
        Commands::Appearance { action } => commands::appearance::handle(&action, ctx, flags).await,
        Commands::Vote { action } => commands::vote::handle(&action, ctx, flags).await,
        Commands::Voting { action } => commands::voting::handle(&action, ctx, flags).await,
        Commands::Audit(args) => commands::audit::handle(&args, ctx, flags).await,
    }
}
