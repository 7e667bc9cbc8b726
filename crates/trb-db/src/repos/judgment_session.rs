//! Judgment session repository.

use chrono::{NaiveDate, Utc};

use trb_core::entities::{JudgmentSession, SessionAppearance};
use trb_core::enums::{AuditAction, EntityType, TrailOp};
use trb_core::ids::PREFIX_JUDGMENT_SESSION;

use crate::error::EngineError;
use crate::generate_id;
use crate::helpers::{parse_date, parse_datetime};
use crate::service::TribunalService;

const SELECT_COLS: &str = "id, title, scheduled_for, created_at";

fn row_to_session(row: &libsql::Row) -> Result<JudgmentSession, EngineError> {
    Ok(JudgmentSession {
        id: row.get::<String>(0)?,
        title: row.get::<String>(1)?,
        scheduled_for: parse_date(&row.get::<String>(2)?)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

impl TribunalService {
    /// Schedule a judgment session.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` for a blank title.
    pub async fn create_judgment_session(
        &self,
        title: &str,
        scheduled_for: NaiveDate,
    ) -> Result<JudgmentSession, EngineError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EngineError::Validation("session title must not be empty".into()));
        }
        let now = Utc::now();

        let txn = self.db().begin().await?;
        let result: Result<JudgmentSession, EngineError> = async {
            let session = JudgmentSession {
                id: generate_id(txn.conn(), PREFIX_JUDGMENT_SESSION).await?,
                title: title.to_string(),
                scheduled_for,
                created_at: now,
            };
            txn.conn()
                .execute(
                    "INSERT INTO judgment_sessions (id, title, scheduled_for, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    libsql::params![
                        session.id.as_str(),
                        session.title.as_str(),
                        scheduled_for.format("%Y-%m-%d").to_string(),
                        now.to_rfc3339()
                    ],
                )
                .await?;
            self.audit::<()>(
                txn.conn(),
                EntityType::JudgmentSession,
                &session.id,
                AuditAction::Created,
                None,
                now,
            )
            .await?;
            Ok(session)
        }
        .await;
        let session = txn.finish(result).await?;

        self.trail_op(&session.id, TrailOp::Create, EntityType::JudgmentSession, &session.id, &session, now);
        tracing::debug!(session_id = %session.id, %scheduled_for, "judgment session scheduled");
        Ok(session)
    }

    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if no session has this id.
    pub async fn get_judgment_session(&self, id: &str) -> Result<JudgmentSession, EngineError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM judgment_sessions WHERE id = ?1"), [id])
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| EngineError::not_found(EntityType::JudgmentSession, id))?;
        row_to_session(&row)
    }

    /// List sessions by date, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the query fails.
    pub async fn list_judgment_sessions(&self, limit: u32) -> Result<Vec<JudgmentSession>, EngineError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM judgment_sessions ORDER BY scheduled_for DESC, id LIMIT ?1"
                ),
                [i64::from(limit)],
            )
            .await?;
        let mut sessions = Vec::new();
        while let Some(row) = rows.next().await? {
            sessions.push(row_to_session(&row)?);
        }
        Ok(sessions)
    }

    /// The docket of a session: every appearance placed on it.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if the session does not exist.
    pub async fn session_docket(&self, session_id: &str) -> Result<Vec<SessionAppearance>, EngineError> {
        self.get_judgment_session(session_id).await?;
        self.list_appearances_in_session(session_id).await
    }
}
