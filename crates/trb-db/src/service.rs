//! Service layer orchestrating engine mutations with audit and trail.
//!
//! `TribunalService` wraps `TribunalDb` (raw database access), `TrailWriter`
//! (JSONL export), the keyed locks and the retry policy. All engine
//! operations are implemented as `impl TribunalService` blocks in `repos/`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use trb_config::TribunalConfig;
use trb_core::entities::AuditEntry;
use trb_core::enums::{AuditAction, EntityType, TrailOp};
use trb_core::ids::PREFIX_AUDIT;
use trb_core::trail::TrailOperation;

use crate::TribunalDb;
use crate::error::EngineError;
use crate::generate_id;
use crate::locks::KeyedLocks;
use crate::retry::RetryConfig;
use crate::trail::writer::TrailWriter;

/// Orchestrates engine mutations with the audit trail and JSONL trail.
///
/// Every mutation follows this protocol:
/// 1. Take the keyed lock(s) of the affected appearance or appeal
/// 2. Begin an immediate transaction
/// 3. Validate, execute SQL, append audit entries (inside the transaction)
/// 4. Commit
/// 5. Append JSONL trail operations (file I/O, failures are logged)
pub struct TribunalService {
    db: TribunalDb,
    trail: TrailWriter,
    retry: RetryConfig,
    appearance_locks: KeyedLocks,
    appeal_locks: KeyedLocks,
    actor: Option<String>,
}

impl TribunalService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    /// * `trail_dir` - Directory for JSONL trail files. `None` disables the trail.
    /// * `actor` - Member id recorded on audit entries.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the database cannot be opened or the trail
    /// directory cannot be created.
    pub async fn new_local(
        db_path: &str,
        trail_dir: Option<PathBuf>,
        actor: Option<String>,
    ) -> Result<Self, EngineError> {
        let db = TribunalDb::open_local(db_path).await?;
        let trail = match trail_dir {
            Some(dir) => TrailWriter::new(dir)?,
            None => TrailWriter::disabled(),
        };
        Ok(Self::from_db(db, trail, actor))
    }

    /// Open the database and trail described by a loaded configuration.
    ///
    /// Creates the database's parent directory when it is a file path.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the directory, database or trail cannot be opened.
    pub async fn from_config(
        config: &TribunalConfig,
        actor: Option<String>,
    ) -> Result<Self, EngineError> {
        if !config.database.is_in_memory() {
            let parent = std::path::Path::new(&config.database.path).parent();
            if let Some(parent) = parent.filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| EngineError::Other(e.into()))?;
            }
        }
        let trail_dir = config
            .trail
            .enabled
            .then(|| PathBuf::from(&config.trail.dir));
        let actor = actor.or_else(|| config.general.actor().map(String::from));
        let service = Self::new_local(&config.database.path, trail_dir, actor).await?;
        Ok(service.with_retry(RetryConfig::from(&config.database)))
    }

    /// Create from an existing `TribunalDb` (for testing).
    #[must_use]
    pub fn from_db(db: TribunalDb, trail: TrailWriter, actor: Option<String>) -> Self {
        Self {
            db,
            trail,
            retry: RetryConfig::default(),
            appearance_locks: KeyedLocks::new(),
            appeal_locks: KeyedLocks::new(),
            actor,
        }
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &TribunalDb {
        &self.db
    }

    /// Access the trail writer.
    #[must_use]
    pub const fn trail(&self) -> &TrailWriter {
        &self.trail
    }

    #[must_use]
    pub const fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    pub(crate) const fn appearance_locks(&self) -> &KeyedLocks {
        &self.appearance_locks
    }

    pub(crate) const fn appeal_locks(&self) -> &KeyedLocks {
        &self.appeal_locks
    }

    /// Member id recorded on audit entries, if any.
    #[must_use]
    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    /// Append an audit entry on `conn` (normally the open transaction).
    pub(crate) async fn audit<D: Serialize>(
        &self,
        conn: &libsql::Connection,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<&D>,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let detail = detail
            .map(serde_json::to_value)
            .transpose()
            .map_err(EngineError::json)?;
        let entry = AuditEntry {
            id: generate_id(conn, PREFIX_AUDIT).await?,
            actor_id: self.actor.clone(),
            entity_type,
            entity_id: entity_id.to_string(),
            action,
            detail,
            created_at: now,
        };
        self.append_audit(conn, &entry).await
    }

    /// Record a committed mutation in the JSONL trail.
    ///
    /// The database change is already durable here, so a failing trail write
    /// is logged rather than returned.
    pub(crate) fn trail_op<T: Serialize>(
        &self,
        scope: &str,
        op: TrailOp,
        entity: EntityType,
        id: &str,
        data: &T,
        now: DateTime<Utc>,
    ) {
        if !self.trail.is_enabled() {
            return;
        }
        let result = serde_json::to_value(data)
            .map_err(EngineError::json)
            .and_then(|data| {
                self.trail.append(&TrailOperation {
                    v: 1,
                    ts: now.to_rfc3339(),
                    scope: scope.to_string(),
                    op,
                    entity,
                    id: id.to_string(),
                    data,
                })
            });
        if let Err(error) = result {
            tracing::warn!(%entity, id, %error, "failed to append trail operation");
        }
    }
}
