//! Distribution tracker.
//!
//! The distribution log of an appeal is append-only. Placing the appeal on a
//! session, or a reviewer joining through a vote, inserts a new snapshot
//! derived from the active one and flips the old one's `is_active` off.
//! The unique index on active snapshots settles races between writers.

use chrono::{DateTime, Utc};

use trb_core::audit_detail::DistributionDetail;
use trb_core::carry::{DistributionDraft, carry_forward};
use trb_core::entities::{Distribution, SessionAppearance};
use trb_core::enums::{AppealStatus, AppearanceStatus, AuditAction, EntityType, TrailOp};
use trb_core::ids::{PREFIX_APPEARANCE, PREFIX_DISTRIBUTION};
use trb_core::responses::PlacementResponse;

use super::appeal::fetch_appeal;
use crate::error::{EngineError, is_unique_violation};
use crate::generate_id;
use crate::helpers::{ensure_exists, get_bool, parse_datetime, parse_id_list};
use crate::retry::with_retry;
use crate::service::TribunalService;

const SELECT_COLS: &str = "id, appeal_id, session_id, rapporteur_id, distributed_to_id, reviewer_ids, ord, is_active, created_at";

fn row_to_distribution(row: &libsql::Row) -> Result<Distribution, EngineError> {
    Ok(Distribution {
        id: row.get::<String>(0)?,
        appeal_id: row.get::<String>(1)?,
        session_id: row.get::<String>(2)?,
        rapporteur_id: row.get::<String>(3)?,
        distributed_to_id: row.get::<String>(4)?,
        reviewer_ids: parse_id_list(&row.get::<String>(5)?)?,
        order: row.get::<i64>(6)?,
        is_active: get_bool(row, 7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

/// The active snapshot of an appeal, if it was ever distributed.
pub(crate) async fn fetch_active_distribution(
    conn: &libsql::Connection,
    appeal_id: &str,
) -> Result<Option<Distribution>, EngineError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM distributions WHERE appeal_id = ?1 AND is_active = 1"),
            [appeal_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_distribution(&row)?)),
        None => Ok(None),
    }
}

impl TribunalService {
    /// Persist `draft` as the new active snapshot of `appeal_id`, superseding
    /// `previous`. Runs inside the caller's transaction.
    pub(crate) async fn append_distribution(
        &self,
        conn: &libsql::Connection,
        appeal_id: &str,
        previous: Option<&Distribution>,
        draft: DistributionDraft,
        action: AuditAction,
        now: DateTime<Utc>,
    ) -> Result<Distribution, EngineError> {
        if let Some(previous) = previous {
            let deactivated = conn
                .execute(
                    "UPDATE distributions SET is_active = 0 WHERE id = ?1 AND is_active = 1",
                    [previous.id.as_str()],
                )
                .await?;
            if deactivated == 0 {
                return Err(EngineError::WriteConflict(format!(
                    "distribution {} of appeal {appeal_id} was superseded concurrently",
                    previous.id
                )));
            }
        }

        let distribution = Distribution {
            id: generate_id(conn, PREFIX_DISTRIBUTION).await?,
            appeal_id: appeal_id.to_string(),
            session_id: draft.session_id,
            rapporteur_id: draft.rapporteur_id,
            distributed_to_id: draft.distributed_to_id,
            reviewer_ids: draft.reviewer_ids,
            order: draft.order,
            is_active: true,
            created_at: now,
        };
        let reviewer_ids = serde_json::to_string(&distribution.reviewer_ids).map_err(EngineError::json)?;
        conn.execute(
            "INSERT INTO distributions (id, appeal_id, session_id, rapporteur_id, distributed_to_id, reviewer_ids, ord, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8)",
            libsql::params![
                distribution.id.as_str(),
                appeal_id,
                distribution.session_id.as_str(),
                distribution.rapporteur_id.as_str(),
                distribution.distributed_to_id.as_str(),
                reviewer_ids,
                distribution.order,
                now.to_rfc3339()
            ],
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                EngineError::WriteConflict(format!(
                    "another active distribution was created for appeal {appeal_id}"
                ))
            } else {
                e.into()
            }
        })?;

        let detail = DistributionDetail {
            appeal_id: appeal_id.to_string(),
            superseded_id: previous.map(|p| p.id.clone()),
            rapporteur_id: distribution.rapporteur_id.clone(),
            distributed_to_id: distribution.distributed_to_id.clone(),
            reviewer_ids: distribution.reviewer_ids.clone(),
        };
        self.audit(conn, EntityType::Distribution, &distribution.id, action, Some(&detail), now)
            .await?;
        Ok(distribution)
    }

    /// Place an appeal on a session's docket and distribute it to `member_id`.
    ///
    /// The first placement names the rapporteur. Later placements carry the
    /// rapporteur and reviewers forward and add `member_id` as a reviewer
    /// when it is new. Creates the session appearance in the same transaction
    /// and moves the appeal into judgment.
    ///
    /// # Errors
    ///
    /// - `NotFound` for a missing appeal, session or member.
    /// - `AlreadyOnDocket` if the appeal already appears on this session.
    /// - `InvalidTransition` if the appeal's decision is already published.
    pub async fn place_on_docket(
        &self,
        appeal_id: &str,
        session_id: &str,
        member_id: &str,
    ) -> Result<PlacementResponse, EngineError> {
        for (field, value) in [
            ("appeal_id", appeal_id),
            ("session_id", session_id),
            ("member_id", member_id),
        ] {
            if value.trim().is_empty() {
                return Err(EngineError::Validation(format!("{field} is required")));
            }
        }

        let _appeal_guard = self.appeal_locks().lock(appeal_id).await;
        let placement = with_retry(self.retry_config(), "assign_distribution", || {
            self.place_once(appeal_id, session_id, member_id)
        })
        .await?;

        let now = placement.distribution.created_at;
        self.trail_op(
            session_id,
            TrailOp::Create,
            EntityType::Distribution,
            &placement.distribution.id,
            &placement.distribution,
            now,
        );
        self.trail_op(
            session_id,
            TrailOp::Create,
            EntityType::Appearance,
            &placement.appearance.id,
            &placement.appearance,
            now,
        );
        tracing::debug!(
            appeal_id,
            session_id,
            distribution_id = %placement.distribution.id,
            rapporteur_id = %placement.distribution.rapporteur_id,
            order = placement.distribution.order,
            "appeal placed on docket"
        );
        Ok(placement)
    }

    /// Distribute an appeal for a session and return the new snapshot.
    ///
    /// See [`TribunalService::place_on_docket`], which also returns the
    /// appearance it created.
    ///
    /// # Errors
    ///
    /// Same as [`TribunalService::place_on_docket`].
    pub async fn assign_distribution(
        &self,
        appeal_id: &str,
        session_id: &str,
        selected_member_id: &str,
    ) -> Result<Distribution, EngineError> {
        Ok(self
            .place_on_docket(appeal_id, session_id, selected_member_id)
            .await?
            .distribution)
    }

    async fn place_once(
        &self,
        appeal_id: &str,
        session_id: &str,
        member_id: &str,
    ) -> Result<PlacementResponse, EngineError> {
        let now = Utc::now();
        let txn = self.db().begin().await?;
        let result: Result<PlacementResponse, EngineError> = async {
            let conn = txn.conn();
            let appeal = fetch_appeal(conn, appeal_id).await?;
            ensure_exists(conn, EntityType::JudgmentSession, session_id).await?;
            ensure_exists(conn, EntityType::Member, member_id).await?;
            if appeal.status == AppealStatus::Published {
                return Err(EngineError::InvalidTransition {
                    entity: EntityType::Appeal,
                    id: appeal_id.to_string(),
                    from: appeal.status.to_string(),
                    to: AppealStatus::InJudgment.to_string(),
                });
            }

            let mut existing = conn
                .query(
                    "SELECT 1 FROM session_appearances WHERE appeal_id = ?1 AND session_id = ?2",
                    [appeal_id, session_id],
                )
                .await?;
            if existing.next().await?.is_some() {
                return Err(already_on_docket(appeal_id, session_id));
            }

            let previous = fetch_active_distribution(conn, appeal_id).await?;
            let draft = carry_forward(previous.as_ref(), session_id, member_id);
            let distribution = self
                .append_distribution(conn, appeal_id, previous.as_ref(), draft, AuditAction::Distributed, now)
                .await?;

            let appearance = SessionAppearance {
                id: generate_id(conn, PREFIX_APPEARANCE).await?,
                appeal_id: appeal_id.to_string(),
                session_id: session_id.to_string(),
                status: AppearanceStatus::OnDocket,
                view_requested_member_id: None,
                diligence_days_deadline: None,
                minutes_text: None,
                created_at: now,
                updated_at: now,
            };
            conn.execute(
                "INSERT INTO session_appearances (id, appeal_id, session_id, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    appearance.id.as_str(),
                    appeal_id,
                    session_id,
                    appearance.status.as_str(),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    already_on_docket(appeal_id, session_id)
                } else {
                    e.into()
                }
            })?;
            self.audit::<()>(conn, EntityType::Appearance, &appearance.id, AuditAction::Created, None, now)
                .await?;
            self.set_appeal_status(conn, appeal_id, AppealStatus::InJudgment, "placed on docket", now)
                .await?;

            Ok(PlacementResponse {
                distribution,
                appearance,
            })
        }
        .await;
        txn.finish(result).await
    }

    /// The active distribution of an appeal, or `None` before its first placement.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if the appeal does not exist.
    pub async fn current_distribution(&self, appeal_id: &str) -> Result<Option<Distribution>, EngineError> {
        let conn = self.db().conn();
        ensure_exists(conn, EntityType::Appeal, appeal_id).await?;
        fetch_active_distribution(conn, appeal_id).await
    }

    /// Every snapshot of an appeal's distribution, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if the appeal does not exist.
    pub async fn distribution_history(&self, appeal_id: &str) -> Result<Vec<Distribution>, EngineError> {
        let conn = self.db().conn();
        ensure_exists(conn, EntityType::Appeal, appeal_id).await?;
        let mut rows = conn
            .query(
                &format!("SELECT {SELECT_COLS} FROM distributions WHERE appeal_id = ?1 ORDER BY ord"),
                [appeal_id],
            )
            .await?;
        let mut history = Vec::new();
        while let Some(row) = rows.next().await? {
            history.push(row_to_distribution(&row)?);
        }
        Ok(history)
    }
}

fn already_on_docket(appeal_id: &str, session_id: &str) -> EngineError {
    EngineError::AlreadyOnDocket {
        appeal_id: appeal_id.to_string(),
        session_id: session_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_appeal, seed_member, seed_session, test_service};
    use pretty_assertions::assert_eq;
    use trb_core::enums::MemberRole;

    #[tokio::test]
    async fn first_placement_names_rapporteur() {
        let svc = test_service().await;
        let appeal = seed_appeal(&svc, "2026/1").await;
        let s1 = seed_session(&svc, "S1").await;
        let m1 = seed_member(&svc, "M1", MemberRole::Rapporteur).await;

        let placement = svc.place_on_docket(&appeal.id, &s1.id, &m1.id).await.unwrap();
        let d = &placement.distribution;
        assert_eq!(d.rapporteur_id, m1.id);
        assert_eq!(d.distributed_to_id, m1.id);
        assert!(d.reviewer_ids.is_empty());
        assert_eq!(d.order, 1);
        assert!(d.is_active);
        assert_eq!(placement.appearance.status, AppearanceStatus::OnDocket);
        assert_eq!(svc.get_appeal(&appeal.id).await.unwrap().status, AppealStatus::InJudgment);
    }

    #[tokio::test]
    async fn second_placement_carries_forward() {
        let svc = test_service().await;
        let appeal = seed_appeal(&svc, "2026/1").await;
        let s1 = seed_session(&svc, "S1").await;
        let s2 = seed_session(&svc, "S2").await;
        let m1 = seed_member(&svc, "M1", MemberRole::Rapporteur).await;
        let m2 = seed_member(&svc, "M2", MemberRole::Reviewer).await;

        let first = svc.assign_distribution(&appeal.id, &s1.id, &m1.id).await.unwrap();
        let second = svc.assign_distribution(&appeal.id, &s2.id, &m2.id).await.unwrap();
        assert_eq!(second.rapporteur_id, m1.id);
        assert_eq!(second.distributed_to_id, m2.id);
        assert_eq!(second.reviewer_ids, vec![m2.id.clone()]);
        assert_eq!(second.order, 2);

        let history = svc.distribution_history(&appeal.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, first.id);
        assert!(!history[0].is_active);
        // Superseding touches nothing but the flag.
        assert_eq!(history[0].rapporteur_id, first.rapporteur_id);
        assert_eq!(history[0].reviewer_ids, first.reviewer_ids);
        assert!(history[1].is_active);

        let current = svc.current_distribution(&appeal.id).await.unwrap().unwrap();
        assert_eq!(current.id, second.id);
    }

    #[tokio::test]
    async fn same_session_twice_is_already_on_docket() {
        let svc = test_service().await;
        let appeal = seed_appeal(&svc, "2026/1").await;
        let s1 = seed_session(&svc, "S1").await;
        let m1 = seed_member(&svc, "M1", MemberRole::Rapporteur).await;

        svc.assign_distribution(&appeal.id, &s1.id, &m1.id).await.unwrap();
        let again = svc.assign_distribution(&appeal.id, &s1.id, &m1.id).await;
        assert!(matches!(again, Err(EngineError::AlreadyOnDocket { .. })));
        assert_eq!(svc.distribution_history(&appeal.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_references_are_not_found() {
        let svc = test_service().await;
        let appeal = seed_appeal(&svc, "2026/1").await;
        let s1 = seed_session(&svc, "S1").await;
        let m1 = seed_member(&svc, "M1", MemberRole::Rapporteur).await;

        let no_appeal = svc.assign_distribution("apl-00000000", &s1.id, &m1.id).await;
        assert!(matches!(no_appeal, Err(EngineError::NotFound { entity: EntityType::Appeal, .. })));
        let no_session = svc.assign_distribution(&appeal.id, "jss-00000000", &m1.id).await;
        assert!(matches!(
            no_session,
            Err(EngineError::NotFound { entity: EntityType::JudgmentSession, .. })
        ));
        let no_member = svc.assign_distribution(&appeal.id, &s1.id, "mem-00000000").await;
        assert!(matches!(no_member, Err(EngineError::NotFound { entity: EntityType::Member, .. })));

        // Nothing was written by the failed attempts.
        assert!(svc.current_distribution(&appeal.id).await.unwrap().is_none());
        assert_eq!(svc.get_appeal(&appeal.id).await.unwrap().status, AppealStatus::Filed);
    }

    #[tokio::test]
    async fn blank_ids_are_validation_errors() {
        let svc = test_service().await;
        let result = svc.assign_distribution("", "jss-1", "mem-1").await;
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[tokio::test]
    async fn lost_supersede_race_is_a_write_conflict() {
        let svc = test_service().await;
        let appeal = seed_appeal(&svc, "2026/1").await;
        let s1 = seed_session(&svc, "S1").await;
        let m1 = seed_member(&svc, "M1", MemberRole::Rapporteur).await;
        let first = svc.assign_distribution(&appeal.id, &s1.id, &m1.id).await.unwrap();

        // Pretend another writer superseded `first` after we read it.
        let stale = Distribution {
            is_active: true,
            ..first.clone()
        };
        svc.db()
            .conn()
            .execute("UPDATE distributions SET is_active = 0 WHERE id = ?1", [first.id.as_str()])
            .await
            .unwrap();

        let txn = svc.db().begin().await.unwrap();
        let draft = carry_forward(Some(&stale), &s1.id, &m1.id);
        let result = svc
            .append_distribution(txn.conn(), &appeal.id, Some(&stale), draft, AuditAction::Distributed, Utc::now())
            .await;
        txn.rollback().await.unwrap();
        assert!(matches!(result, Err(EngineError::WriteConflict(_))));
        assert!(result.unwrap_err().is_retryable());
    }
}
