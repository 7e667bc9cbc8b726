//! Appeal repository and coarse status writes.

use chrono::{DateTime, Utc};

use trb_core::audit_detail::StatusChangedDetail;
use trb_core::entities::Appeal;
use trb_core::enums::{AppealStatus, AuditAction, EntityType, TrailOp};
use trb_core::ids::PREFIX_APPEAL;
use trb_core::trail::REGISTRY_SCOPE;

use crate::error::{EngineError, is_unique_violation};
use crate::generate_id;
use crate::helpers::{parse_datetime, parse_enum};
use crate::service::TribunalService;

const SELECT_COLS: &str = "id, protocol_number, status, created_at, updated_at";

fn row_to_appeal(row: &libsql::Row) -> Result<Appeal, EngineError> {
    Ok(Appeal {
        id: row.get::<String>(0)?,
        protocol_number: row.get::<String>(1)?,
        status: parse_enum(&row.get::<String>(2)?)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        updated_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

pub(crate) async fn fetch_appeal(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Appeal, EngineError> {
    let mut rows = conn
        .query(&format!("SELECT {SELECT_COLS} FROM appeals WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| EngineError::not_found(EntityType::Appeal, id))?;
    row_to_appeal(&row)
}

impl TribunalService {
    /// Move an appeal to `status` inside an open transaction.
    ///
    /// A no-op (no write, no audit entry) when the appeal is already there.
    /// Returns the previous status.
    pub(crate) async fn set_appeal_status(
        &self,
        conn: &libsql::Connection,
        appeal_id: &str,
        status: AppealStatus,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<AppealStatus, EngineError> {
        let appeal = fetch_appeal(conn, appeal_id).await?;
        if appeal.status == status {
            return Ok(appeal.status);
        }
        conn.execute(
            "UPDATE appeals SET status = ?1, updated_at = ?2 WHERE id = ?3",
            libsql::params![status.as_str(), now.to_rfc3339(), appeal_id],
        )
        .await?;
        let detail = StatusChangedDetail {
            from: appeal.status.as_str().to_string(),
            to: status.as_str().to_string(),
            reason: Some(reason.to_string()),
        };
        self.audit(conn, EntityType::Appeal, appeal_id, AuditAction::StatusChanged, Some(&detail), now)
            .await?;
        Ok(appeal.status)
    }

    /// File a new appeal under a protocol number.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` for a blank or already used protocol number.
    pub async fn create_appeal(&self, protocol_number: &str) -> Result<Appeal, EngineError> {
        let protocol_number = protocol_number.trim();
        if protocol_number.is_empty() {
            return Err(EngineError::Validation("protocol_number must not be empty".into()));
        }
        let now = Utc::now();

        let txn = self.db().begin().await?;
        let result: Result<Appeal, EngineError> = async {
            let appeal = Appeal {
                id: generate_id(txn.conn(), PREFIX_APPEAL).await?,
                protocol_number: protocol_number.to_string(),
                status: AppealStatus::Filed,
                created_at: now,
                updated_at: now,
            };
            txn.conn()
                .execute(
                    "INSERT INTO appeals (id, protocol_number, status, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    libsql::params![
                        appeal.id.as_str(),
                        appeal.protocol_number.as_str(),
                        appeal.status.as_str(),
                        now.to_rfc3339(),
                        now.to_rfc3339()
                    ],
                )
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        EngineError::Validation(format!(
                            "protocol number '{protocol_number}' is already registered"
                        ))
                    } else {
                        e.into()
                    }
                })?;
            self.audit::<()>(txn.conn(), EntityType::Appeal, &appeal.id, AuditAction::Created, None, now)
                .await?;
            Ok(appeal)
        }
        .await;
        let appeal = txn.finish(result).await?;

        self.trail_op(REGISTRY_SCOPE, TrailOp::Create, EntityType::Appeal, &appeal.id, &appeal, now);
        tracing::debug!(appeal_id = %appeal.id, protocol = %appeal.protocol_number, "appeal filed");
        Ok(appeal)
    }

    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if no appeal has this id.
    pub async fn get_appeal(&self, id: &str) -> Result<Appeal, EngineError> {
        fetch_appeal(self.db().conn(), id).await
    }

    /// List appeals, optionally in one status, newest first.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the query fails.
    pub async fn list_appeals(
        &self,
        status: Option<AppealStatus>,
        limit: u32,
    ) -> Result<Vec<Appeal>, EngineError> {
        let mut rows = match status {
            Some(status) => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {SELECT_COLS} FROM appeals WHERE status = ?1
                             ORDER BY created_at DESC, rowid DESC LIMIT ?2"
                        ),
                        libsql::params![status.as_str(), i64::from(limit)],
                    )
                    .await?
            }
            None => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {SELECT_COLS} FROM appeals ORDER BY created_at DESC, rowid DESC LIMIT ?1"
                        ),
                        [i64::from(limit)],
                    )
                    .await?
            }
        };
        let mut appeals = Vec::new();
        while let Some(row) = rows.next().await? {
            appeals.push(row_to_appeal(&row)?);
        }
        Ok(appeals)
    }

    /// Publish the decision of a judged appeal.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidTransition` unless the appeal is pending
    /// publication.
    pub async fn publish_decision(&self, appeal_id: &str) -> Result<Appeal, EngineError> {
        let _appeal_guard = self.appeal_locks().lock(appeal_id).await;
        let now = Utc::now();

        let txn = self.db().begin().await?;
        let result: Result<Appeal, EngineError> = async {
            let appeal = fetch_appeal(txn.conn(), appeal_id).await?;
            if appeal.status != AppealStatus::PendingPublication {
                return Err(EngineError::InvalidTransition {
                    entity: EntityType::Appeal,
                    id: appeal_id.to_string(),
                    from: appeal.status.to_string(),
                    to: AppealStatus::Published.to_string(),
                });
            }
            txn.conn()
                .execute(
                    "UPDATE appeals SET status = ?1, updated_at = ?2 WHERE id = ?3",
                    libsql::params![AppealStatus::Published.as_str(), now.to_rfc3339(), appeal_id],
                )
                .await?;
            let detail = StatusChangedDetail {
                from: appeal.status.as_str().to_string(),
                to: AppealStatus::Published.as_str().to_string(),
                reason: None,
            };
            self.audit(txn.conn(), EntityType::Appeal, appeal_id, AuditAction::Published, Some(&detail), now)
                .await?;
            fetch_appeal(txn.conn(), appeal_id).await
        }
        .await;
        let appeal = txn.finish(result).await?;

        self.trail_op(REGISTRY_SCOPE, TrailOp::Transition, EntityType::Appeal, appeal_id, &appeal, now);
        tracing::debug!(appeal_id, "decision published");
        Ok(appeal)
    }
}
