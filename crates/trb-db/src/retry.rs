//! Bounded retry for writes that lose a race.
//!
//! Uniqueness races (two placements of the same appeal, two first votes of
//! the same shape) are settled by unique indexes. The loser sees
//! `EngineError::WriteConflict`, or `SQLITE_BUSY` when another process holds
//! the write lock, and re-runs the whole transaction after a short backoff.
//! Every other error is returned immediately.

use std::future::Future;
use std::time::Duration;

use trb_config::DatabaseConfig;

use crate::error::EngineError;

/// Configuration for retry behavior on write conflicts.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(25),
            max_delay: Duration::from_millis(500),
        }
    }
}

impl From<&DatabaseConfig> for RetryConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_attempts: config.retry_attempts.max(1),
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            max_delay: Duration::from_millis(config.retry_max_delay_ms),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based), doubling each time.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Detect lock contention from another connection or process.
pub fn is_busy_error(e: &libsql::Error) -> bool {
    let msg = e.to_string();
    msg.contains("database is locked") || msg.contains("SQLITE_BUSY")
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// attempts run out.
///
/// # Errors
///
/// Returns the last error produced by `op`.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    operation: &str,
    mut op: F,
) -> Result<T, EngineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EngineError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(error) if error.is_retryable() && attempt < config.max_attempts => {
                let delay = config.delay_for(attempt);
                tracing::warn!(
                    operation,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    %error,
                    "write conflict; retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for(1), Duration::from_millis(25));
        assert_eq!(config.delay_for(2), Duration::from_millis(50));
        assert_eq!(config.delay_for(3), Duration::from_millis(100));
        assert_eq!(config.delay_for(10), Duration::from_millis(500));
    }

    #[test]
    fn built_from_database_config() {
        let db = DatabaseConfig {
            retry_attempts: 0,
            ..DatabaseConfig::default()
        };
        assert_eq!(RetryConfig::from(&db).max_attempts, 1);
    }

    #[tokio::test]
    async fn retries_conflicts_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&fast(), "test", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(EngineError::WriteConflict("race".into()))
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&fast(), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(EngineError::WriteConflict("race".into()))
        })
        .await;
        assert!(matches!(result, Err(EngineError::WriteConflict(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_domain_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&fast(), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(EngineError::AlreadyClosed("vtg-1".into()))
        })
        .await;
        assert!(matches!(result, Err(EngineError::AlreadyClosed(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
