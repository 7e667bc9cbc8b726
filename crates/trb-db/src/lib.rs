//! # trb-db
//!
//! libSQL persistence and the judgment-session voting engine for Tribunal.
//!
//! Holds all relational state: members, appeals, judgment sessions, the
//! distribution log, session appearances, votes, votings, judgments and the
//! audit trail. Engine operations are `impl TribunalService` blocks under
//! [`repos`], one file per component.

pub mod error;
pub mod helpers;
pub mod locks;
mod migrations;
pub mod repos;
pub mod requests;
pub mod retry;
pub mod service;
pub mod trail;

mod test_support;

use error::EngineError;
use libsql::{Builder, TransactionBehavior};
use tokio::sync::{Mutex, MutexGuard};

/// Central database handle.
///
/// Wraps a libSQL database and a single shared connection. Writes that touch
/// more than one row go through [`TribunalDb::begin`], which serializes
/// transactions on the connection.
pub struct TribunalDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    write_gate: Mutex<()>,
}

/// An open write transaction holding the connection's write gate.
///
/// Dropped without [`WriteTxn::commit`], the transaction rolls back.
pub struct WriteTxn<'a> {
    _gate: MutexGuard<'a, ()>,
    tx: libsql::Transaction,
}

impl WriteTxn<'_> {
    /// Connection bound to this transaction.
    #[must_use]
    pub fn conn(&self) -> &libsql::Connection {
        &self.tx
    }

    /// # Errors
    ///
    /// Returns `EngineError` if `COMMIT` fails.
    pub async fn commit(self) -> Result<(), EngineError> {
        self.tx.commit().await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `EngineError` if `ROLLBACK` fails.
    pub async fn rollback(self) -> Result<(), EngineError> {
        self.tx.rollback().await?;
        Ok(())
    }

    /// Commit on `Ok`, roll back on `Err`, and pass the result through.
    ///
    /// # Errors
    ///
    /// Returns the operation's error, or the `COMMIT` error.
    pub async fn finish<T>(self, result: Result<T, EngineError>) -> Result<T, EngineError> {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback_error) = self.rollback().await {
                    tracing::warn!(%rollback_error, "rollback failed");
                }
                Err(error)
            }
        }
    }
}

impl TribunalDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, EngineError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| EngineError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let tribunal_db = Self {
            db,
            conn,
            write_gate: Mutex::new(()),
        };
        tribunal_db.run_migrations().await?;
        Ok(tribunal_db)
    }

    /// Access the underlying libSQL connection for reads.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Start an immediate write transaction.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if `BEGIN IMMEDIATE` fails (busy databases
    /// surface here and are retryable).
    pub async fn begin(&self) -> Result<WriteTxn<'_>, EngineError> {
        let gate = self.write_gate.lock().await;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await?;
        Ok(WriteTxn { _gate: gate, tx })
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"vot-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, EngineError> {
        generate_id(&self.conn, prefix).await
    }
}

/// Generate a prefixed ID on a specific connection (inside a transaction).
///
/// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
///
/// # Errors
///
/// Returns `EngineError` if the query fails or returns no rows.
pub async fn generate_id(conn: &libsql::Connection, prefix: &str) -> Result<String, EngineError> {
    let mut rows = conn
        .query("SELECT ?1 || '-' || lower(hex(randomblob(4)))", [prefix])
        .await?;
    let row = rows.next().await?.ok_or(EngineError::NoResult)?;
    Ok(row.get::<String>(0)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> TribunalDb {
        TribunalDb::open_local(":memory:").await.unwrap()
    }

    async fn count(db: &TribunalDb, sql: &str) -> i64 {
        let mut rows = db.conn().query(sql, ()).await.unwrap();
        rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "members",
            "decisions",
            "appeals",
            "judgment_sessions",
            "distributions",
            "session_appearances",
            "votings",
            "votes",
            "judgments",
            "audit_trail",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("vot").await.unwrap();
        assert!(id.starts_with("vot-"), "ID should start with 'vot-': {id}");
        assert_eq!(id.len(), 12, "ID should be 12 chars: {id}");
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_all_prefixes() {
        let db = test_db().await;
        for prefix in trb_core::ids::ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert_eq!(trb_core::ids::prefix_of(&id), Some(*prefix));
        }
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("tst").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn finish_rolls_back_on_error() {
        let db = test_db().await;
        let txn = db.begin().await.unwrap();
        txn.conn()
            .execute(
                "INSERT INTO members (id, name, role, created_at) VALUES ('mem-1', 'Ana', 'voting', '2026-01-01T00:00:00Z')",
                (),
            )
            .await
            .unwrap();
        let result: Result<(), _> = txn.finish(Err(EngineError::NoResult)).await;
        assert!(result.is_err());
        assert_eq!(count(&db, "SELECT COUNT(*) FROM members").await, 0);

        let txn = db.begin().await.unwrap();
        txn.conn()
            .execute(
                "INSERT INTO members (id, name, role, created_at) VALUES ('mem-1', 'Ana', 'voting', '2026-01-01T00:00:00Z')",
                (),
            )
            .await
            .unwrap();
        txn.finish(Ok(())).await.unwrap();
        assert_eq!(count(&db, "SELECT COUNT(*) FROM members").await, 1);
    }

    #[tokio::test]
    async fn only_one_pending_voting_per_key() {
        let db = test_db().await;
        let now = "2026-01-01T00:00:00Z";
        db.conn()
            .execute_batch(&format!(
                "INSERT INTO appeals (id, protocol_number, created_at, updated_at) VALUES ('apl-1', 'P-1', '{now}', '{now}');
                 INSERT INTO judgment_sessions (id, title, scheduled_for, created_at) VALUES ('jss-1', 'S1', '2026-03-12', '{now}');
                 INSERT INTO session_appearances (id, appeal_id, session_id, created_at, updated_at) VALUES ('apr-1', 'apl-1', 'jss-1', '{now}', '{now}');
                 INSERT INTO votings (id, appearance_id, voting_type, group_key, created_at) VALUES ('vtg-1', 'apr-1', 'merit', 'bare', '{now}');"
            ))
            .await
            .unwrap();

        let duplicate = db
            .conn()
            .execute(
                "INSERT INTO votings (id, appearance_id, voting_type, group_key, created_at) VALUES ('vtg-2', 'apr-1', 'merit', 'bare', ?1)",
                [now],
            )
            .await;
        assert!(duplicate.is_err(), "second pending voting should be rejected");

        // Once closed, a new pending voting with the same key is allowed and
        // the closed one is frozen.
        db.conn()
            .execute("UPDATE votings SET status = 'closed' WHERE id = 'vtg-1'", ())
            .await
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO votings (id, appearance_id, voting_type, group_key, created_at) VALUES ('vtg-2', 'apr-1', 'merit', 'bare', ?1)",
                [now],
            )
            .await
            .unwrap();
        let reopen = db
            .conn()
            .execute("UPDATE votings SET status = 'pending' WHERE id = 'vtg-1'", ())
            .await;
        assert!(reopen.is_err(), "closed voting must be immutable");
    }
}
