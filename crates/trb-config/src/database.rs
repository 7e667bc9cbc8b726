//! libSQL database configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_path() -> String {
    String::from(".tribunal/tribunal.db")
}

/// Default number of attempts for a write that lost a uniqueness race.
const fn default_retry_attempts() -> u32 {
    4
}

const fn default_retry_base_delay_ms() -> u64 {
    25
}

const fn default_retry_max_delay_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path of the local database file, or `:memory:`.
    #[serde(default = "default_path")]
    pub path: String,

    /// Maximum attempts (including the first) for conflicting writes.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Upper bound for the exponential backoff, in milliseconds.
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            retry_attempts: default_retry_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl DatabaseConfig {
    /// Whether the database lives only in memory.
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.retry_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.retry_attempts".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.retry_base_delay_ms > self.retry_max_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "database.retry_base_delay_ms".into(),
                reason: format!(
                    "must not exceed retry_max_delay_ms ({})",
                    self.retry_max_delay_ms
                ),
            });
        }
        Ok(())
    }
}
