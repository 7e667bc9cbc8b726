//! Appeal status machine.
//!
//! Appearance transitions and the judgment they may produce. The appeal's
//! coarse status follows its most recent appearance; moving an older one
//! leaves the appeal alone.

use chrono::Utc;

use trb_core::audit_detail::StatusChangedDetail;
use trb_core::entities::{Judgment, SessionAppearance};
use trb_core::enums::{AppearanceStatus, AuditAction, EntityType, TrailOp};
use trb_core::ids::PREFIX_JUDGMENT;

use crate::error::EngineError;
use crate::generate_id;
use crate::helpers::{ensure_exists, get_opt_string, parse_datetime, parse_enum};
use crate::requests::appearance::StatusChange;
use crate::service::TribunalService;

const SELECT_COLS: &str = "id, appeal_id, session_id, status, view_requested_member_id, diligence_days_deadline, minutes_text, created_at, updated_at";

fn row_to_appearance(row: &libsql::Row) -> Result<SessionAppearance, EngineError> {
    Ok(SessionAppearance {
        id: row.get::<String>(0)?,
        appeal_id: row.get::<String>(1)?,
        session_id: row.get::<String>(2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        view_requested_member_id: get_opt_string(row, 4)?,
        diligence_days_deadline: row.get::<Option<i64>>(5)?,
        minutes_text: get_opt_string(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

fn row_to_judgment(row: &libsql::Row) -> Result<Judgment, EngineError> {
    Ok(Judgment {
        id: row.get::<String>(0)?,
        appearance_id: row.get::<String>(1)?,
        voting_id: row.get::<String>(2)?,
        minutes_text: get_opt_string(row, 3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

pub(crate) async fn fetch_appearance(
    conn: &libsql::Connection,
    id: &str,
) -> Result<SessionAppearance, EngineError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM session_appearances WHERE id = ?1"),
            [id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| EngineError::not_found(EntityType::Appearance, id))?;
    row_to_appearance(&row)
}

/// Most recently closed merit voting of an appearance.
async fn latest_closed_merit_voting(
    conn: &libsql::Connection,
    appearance_id: &str,
) -> Result<Option<String>, EngineError> {
    let mut rows = conn
        .query(
            "SELECT id FROM votings
             WHERE appearance_id = ?1 AND voting_type = 'merit' AND status = 'closed'
             ORDER BY closed_at DESC, rowid DESC LIMIT 1",
            [appearance_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row.get::<String>(0)?)),
        None => Ok(None),
    }
}

/// The appeal's most recently created appearance.
async fn latest_appearance_id(
    conn: &libsql::Connection,
    appeal_id: &str,
) -> Result<Option<String>, EngineError> {
    let mut rows = conn
        .query(
            "SELECT id FROM session_appearances WHERE appeal_id = ?1
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            [appeal_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row.get::<String>(0)?)),
        None => Ok(None),
    }
}

impl TribunalService {
    /// Move an appearance to a new status.
    ///
    /// Judging requires a closed merit voting and records a judgment that
    /// references the most recently closed one. A judged appearance never
    /// moves again. When this is the appeal's latest appearance, the
    /// appeal's coarse status is updated in the same transaction. Minutes
    /// are kept only on a judged appearance.
    ///
    /// # Errors
    ///
    /// - `Validation` when the target status is missing a required field.
    /// - `NotFound` for a missing appearance or view-requesting member.
    /// - `InvalidTransition` when the appearance is already judged.
    /// - `NoMeritVoting` when judging without a closed merit voting.
    pub async fn transition_appearance(
        &self,
        appearance_id: &str,
        change: StatusChange,
    ) -> Result<SessionAppearance, EngineError> {
        let change = change.normalized()?;
        let appeal_id = fetch_appearance(self.db().conn(), appearance_id)
            .await?
            .appeal_id;

        let _appearance_guard = self.appearance_locks().lock(appearance_id).await;
        let _appeal_guard = self.appeal_locks().lock(&appeal_id).await;
        let now = Utc::now();

        let txn = self.db().begin().await?;
        let result: Result<(SessionAppearance, Option<Judgment>), EngineError> = async {
            let conn = txn.conn();
            let current = fetch_appearance(conn, appearance_id).await?;
            if !current.status.can_transition_to(change.status) {
                return Err(EngineError::InvalidTransition {
                    entity: EntityType::Appearance,
                    id: appearance_id.to_string(),
                    from: current.status.to_string(),
                    to: change.status.to_string(),
                });
            }
            if let Some(member_id) = change.view_requested_member_id.as_deref() {
                ensure_exists(conn, EntityType::Member, member_id).await?;
            }

            let judgment = if change.status == AppearanceStatus::Judged {
                let voting_id = latest_closed_merit_voting(conn, appearance_id)
                    .await?
                    .ok_or_else(|| EngineError::NoMeritVoting(appearance_id.to_string()))?;
                let judgment = Judgment {
                    id: generate_id(conn, PREFIX_JUDGMENT).await?,
                    appearance_id: appearance_id.to_string(),
                    voting_id,
                    minutes_text: change.minutes_text.clone(),
                    created_at: now,
                };
                conn.execute(
                    "INSERT INTO judgments (id, appearance_id, voting_id, minutes_text, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    libsql::params![
                        judgment.id.as_str(),
                        appearance_id,
                        judgment.voting_id.as_str(),
                        judgment.minutes_text.as_deref(),
                        now.to_rfc3339()
                    ],
                )
                .await?;
                self.audit::<()>(conn, EntityType::Judgment, &judgment.id, AuditAction::Created, None, now)
                    .await?;
                Some(judgment)
            } else {
                None
            };

            conn.execute(
                "UPDATE session_appearances
                 SET status = ?1, view_requested_member_id = ?2, diligence_days_deadline = ?3,
                     minutes_text = ?4, updated_at = ?5
                 WHERE id = ?6",
                libsql::params![
                    change.status.as_str(),
                    change.view_requested_member_id.as_deref(),
                    change.diligence_days_deadline,
                    change.minutes_text.as_deref(),
                    now.to_rfc3339(),
                    appearance_id
                ],
            )
            .await?;
            let detail = StatusChangedDetail {
                from: current.status.as_str().to_string(),
                to: change.status.as_str().to_string(),
                reason: None,
            };
            self.audit(conn, EntityType::Appearance, appearance_id, AuditAction::StatusChanged, Some(&detail), now)
                .await?;
            let latest = latest_appearance_id(conn, &current.appeal_id).await?;
            if latest.as_deref() == Some(appearance_id) {
                self.set_appeal_status(
                    conn,
                    &current.appeal_id,
                    change.status.appeal_status(),
                    &format!("appearance {appearance_id} {}", change.status),
                    now,
                )
                .await?;
            }

            Ok((fetch_appearance(conn, appearance_id).await?, judgment))
        }
        .await;
        let (appearance, judgment) = txn.finish(result).await?;

        self.trail_op(
            &appearance.session_id,
            TrailOp::Transition,
            EntityType::Appearance,
            appearance_id,
            &change,
            now,
        );
        if let Some(judgment) = &judgment {
            self.trail_op(
                &appearance.session_id,
                TrailOp::Create,
                EntityType::Judgment,
                &judgment.id,
                judgment,
                now,
            );
        }
        tracing::debug!(appearance_id, status = %appearance.status, "appearance transitioned");
        Ok(appearance)
    }

    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if no appearance has this id.
    pub async fn get_appearance(&self, id: &str) -> Result<SessionAppearance, EngineError> {
        fetch_appearance(self.db().conn(), id).await
    }

    /// Every appearance of an appeal, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if the appeal does not exist.
    pub async fn list_appearances(&self, appeal_id: &str) -> Result<Vec<SessionAppearance>, EngineError> {
        let conn = self.db().conn();
        ensure_exists(conn, EntityType::Appeal, appeal_id).await?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM session_appearances WHERE appeal_id = ?1 ORDER BY created_at, rowid"
                ),
                [appeal_id],
            )
            .await?;
        let mut appearances = Vec::new();
        while let Some(row) = rows.next().await? {
            appearances.push(row_to_appearance(&row)?);
        }
        Ok(appearances)
    }

    pub(crate) async fn list_appearances_in_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<SessionAppearance>, EngineError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM session_appearances WHERE session_id = ?1 ORDER BY created_at, rowid"
                ),
                [session_id],
            )
            .await?;
        let mut appearances = Vec::new();
        while let Some(row) = rows.next().await? {
            appearances.push(row_to_appearance(&row)?);
        }
        Ok(appearances)
    }

    /// The judgment recorded when the appearance was judged, if any.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if the appearance does not exist.
    pub async fn get_judgment(&self, appearance_id: &str) -> Result<Option<Judgment>, EngineError> {
        let conn = self.db().conn();
        ensure_exists(conn, EntityType::Appearance, appearance_id).await?;
        let mut rows = conn
            .query(
                "SELECT id, appearance_id, voting_id, minutes_text, created_at
                 FROM judgments WHERE appearance_id = ?1",
                [appearance_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_judgment(&row)?)),
            None => Ok(None),
        }
    }
}
