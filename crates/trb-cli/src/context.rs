use anyhow::Context;
use trb_config::TribunalConfig;
use trb_db::service::TribunalService;

use crate::cli::GlobalFlags;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: TribunalService,
    pub config: TribunalConfig,
}

impl AppContext {
    pub async fn init(config: TribunalConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let service = TribunalService::from_config(&config, flags.actor.clone())
            .await
            .with_context(|| format!("failed to open database at {}", config.database.path))?;
        tracing::debug!(
            db = %config.database.path,
            trail = service.trail().is_enabled(),
            actor = service.actor().unwrap_or("-"),
            "tribunal service ready"
        );
        Ok(Self { service, config })
    }

    /// Page size for list commands: flag first, then `general.default_limit`.
    pub fn limit(&self, flags: &GlobalFlags) -> u32 {
        flags.limit.unwrap_or(self.config.general.default_limit)
    }
}

/// Load layered configuration and apply command-line overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<TribunalConfig> {
    let mut config = TribunalConfig::load_with_dotenv().context("failed to load configuration")?;
    if let Some(path) = &flags.db {
        config.database.path.clone_from(path);
    }
    Ok(config)
}
