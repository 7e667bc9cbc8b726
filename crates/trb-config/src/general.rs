//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default result limit.
const fn default_limit() -> u32 {
    20
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Member ID recorded as the actor on audit entries when `--actor` is not given.
    #[serde(default)]
    pub actor_id: String,

    /// Default result limit for list commands.
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            actor_id: String::new(),
            default_limit: default_limit(),
        }
    }
}

impl GeneralConfig {
    /// Configured actor, if any.
    pub fn actor(&self) -> Option<&str> {
        Some(self.actor_id.as_str()).filter(|id| !id.is_empty())
    }
}
