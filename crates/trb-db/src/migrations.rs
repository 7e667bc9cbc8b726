//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements use `IF NOT EXISTS` for idempotent re-running.

use crate::TribunalDb;
use crate::error::EngineError;

/// Initial schema: 10 tables, 9 indexes, 4 triggers.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");

impl TribunalDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), EngineError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| EngineError::Migration(format!("001_initial: {e}")))?;
        Ok(())
    }
}
