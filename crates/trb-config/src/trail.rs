//! JSONL operation trail configuration.

use serde::{Deserialize, Serialize};

fn default_dir() -> String {
    String::from(".tribunal/trail")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrailConfig {
    /// Whether engine mutations are appended to per-session JSONL files.
    #[serde(default)]
    pub enabled: bool,

    /// Directory holding the trail files.
    #[serde(default = "default_dir")]
    pub dir: String,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_dir(),
        }
    }
}
