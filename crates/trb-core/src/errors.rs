//! Cross-cutting error types for Tribunal.
//!
//! Persistence-level failures live in `trb-db` (`EngineError`), which wraps
//! these so that pure-domain checks can run without a database.

use thiserror::Error;

/// Errors raised by domain checks that need no persistence.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Data failed validation (missing or malformed field).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A casting vote was supplied for a tally that is not tied.
    #[error("Quality vote used but the tally is not tied ({in_favor} in favor, {against} against)")]
    QualityVoteWithoutTie { in_favor: i64, against: i64 },
}
