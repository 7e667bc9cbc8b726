//! Vote aggregator.
//!
//! Folds ungrouped votes of an appearance into votings keyed by
//! `(voting type, preliminary decision)`. Runs after every recorded vote and
//! can be re-run at any time: with nothing ungrouped it writes nothing.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use trb_core::audit_detail::GroupedDetail;
use trb_core::enums::{AuditAction, EntityType, KnowledgeType, TrailOp};
use trb_core::grouping::VotingKey;
use trb_core::ids::PREFIX_VOTING;
use trb_core::responses::AggregationReport;

use super::status::fetch_appearance;
use crate::error::EngineError;
use crate::generate_id;
use crate::helpers::{get_opt_string, parse_enum};
use crate::service::TribunalService;

async fn pending_voting_id(
    conn: &libsql::Connection,
    appearance_id: &str,
    key: &VotingKey,
) -> Result<Option<String>, EngineError> {
    let mut rows = conn
        .query(
            "SELECT id FROM votings
             WHERE appearance_id = ?1 AND voting_type = ?2 AND group_key = ?3 AND status = 'pending'",
            [
                appearance_id,
                key.voting_type.as_str(),
                key.group.storage_key().as_str(),
            ],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row.get::<String>(0)?)),
        None => Ok(None),
    }
}

/// Find the pending voting for `key`, creating it when there is none.
///
/// Returns the voting id and whether this call created it.
async fn find_or_create_voting(
    conn: &libsql::Connection,
    appearance_id: &str,
    key: &VotingKey,
    now: DateTime<Utc>,
) -> Result<(String, bool), EngineError> {
    if let Some(id) = pending_voting_id(conn, appearance_id, key).await? {
        return Ok((id, false));
    }
    let id = generate_id(conn, PREFIX_VOTING).await?;
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO votings (id, appearance_id, voting_type, preliminary_decision_id, group_key, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6)",
            libsql::params![
                id.as_str(),
                appearance_id,
                key.voting_type.as_str(),
                key.group.preliminary_decision_id(),
                key.group.storage_key(),
                now.to_rfc3339()
            ],
        )
        .await?;
    let winner = pending_voting_id(conn, appearance_id, key)
        .await?
        .ok_or_else(|| {
            EngineError::WriteConflict(format!(
                "pending {} voting of appearance {appearance_id} vanished",
                key.voting_type
            ))
        })?;
    Ok((winner, inserted == 1))
}

impl TribunalService {
    /// Group every ungrouped vote of an appearance into its voting.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if the appearance does not exist.
    pub async fn aggregate(&self, appearance_id: &str) -> Result<AggregationReport, EngineError> {
        let _appearance_guard = self.appearance_locks().lock(appearance_id).await;
        self.aggregate_locked(appearance_id).await
    }

    /// [`TribunalService::aggregate`] for callers already holding the
    /// appearance lock.
    pub(crate) async fn aggregate_locked(
        &self,
        appearance_id: &str,
    ) -> Result<AggregationReport, EngineError> {
        let now = Utc::now();
        let txn = self.db().begin().await?;
        let result: Result<(AggregationReport, Vec<GroupedDetail>, String), EngineError> = async {
            let conn = txn.conn();
            let appearance = fetch_appearance(conn, appearance_id).await?;

            let mut rows = conn
                .query(
                    "SELECT id, knowledge_type, preliminary_decision_id FROM votes
                     WHERE appearance_id = ?1 AND voting_id IS NULL
                     ORDER BY created_at, rowid",
                    [appearance_id],
                )
                .await?;
            let mut buckets: BTreeMap<VotingKey, Vec<String>> = BTreeMap::new();
            while let Some(row) = rows.next().await? {
                let knowledge_type: KnowledgeType = parse_enum(&row.get::<String>(1)?)?;
                let preliminary = get_opt_string(&row, 2)?;
                buckets
                    .entry(VotingKey::for_vote(knowledge_type, preliminary.as_deref()))
                    .or_default()
                    .push(row.get::<String>(0)?);
            }

            let mut report = AggregationReport::default();
            let mut grouped = Vec::with_capacity(buckets.len());
            for (key, vote_ids) in buckets {
                let (voting_id, created) = find_or_create_voting(conn, appearance_id, &key, now).await?;
                if created {
                    report.votings_created += 1;
                }

                let placeholders = (0..vote_ids.len())
                    .map(|i| format!("?{}", i + 2))
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut params: Vec<libsql::Value> = Vec::with_capacity(vote_ids.len() + 1);
                params.push(voting_id.as_str().into());
                params.extend(vote_ids.iter().map(|id| libsql::Value::from(id.as_str())));
                let updated = conn
                    .execute(
                        &format!(
                            "UPDATE votes SET voting_id = ?1 WHERE id IN ({placeholders}) AND voting_id IS NULL"
                        ),
                        libsql::params_from_iter(params),
                    )
                    .await?;
                report.votes_grouped += u32::try_from(updated).unwrap_or(u32::MAX);

                let detail = GroupedDetail {
                    voting_id: voting_id.clone(),
                    vote_ids,
                    created,
                };
                self.audit(conn, EntityType::Voting, &voting_id, AuditAction::Grouped, Some(&detail), now)
                    .await?;
                grouped.push(detail);
            }
            Ok((report, grouped, appearance.session_id))
        }
        .await;
        let (report, grouped, session_id) = txn.finish(result).await?;

        for detail in &grouped {
            self.trail_op(&session_id, TrailOp::Group, EntityType::Voting, &detail.voting_id, detail, now);
        }
        if !report.is_noop() {
            tracing::debug!(
                appearance_id,
                votings_created = report.votings_created,
                votes_grouped = report.votes_grouped,
                "votes aggregated"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_placement, test_service};

    async fn insert_raw_vote(
        svc: &TribunalService,
        appearance_id: &str,
        member_id: &str,
        knowledge: KnowledgeType,
        preliminary: Option<&str>,
        merit: Option<&str>,
    ) -> String {
        let id = svc.db().generate_id("vot").await.unwrap();
        let key = VotingKey::for_vote(knowledge, preliminary);
        svc.db()
            .conn()
            .execute(
                "INSERT INTO votes (id, appearance_id, member_id, vote_role, knowledge_type, preliminary_decision_id, merit_decision_id, group_key, text, created_at)
                 VALUES (?1, ?2, ?3, 'member', ?4, ?5, ?6, ?7, 'voto', ?8)",
                libsql::params![
                    id.as_str(),
                    appearance_id,
                    member_id,
                    knowledge.as_str(),
                    preliminary,
                    merit,
                    key.group.storage_key(),
                    Utc::now().to_rfc3339()
                ],
            )
            .await
            .unwrap();
        id
    }

    #[tokio::test]
    async fn aggregate_is_idempotent() {
        let svc = test_service().await;
        let placement = seed_placement(&svc).await;
        insert_raw_vote(&svc, &placement.appearance_id, &placement.rapporteur_id, KnowledgeType::NoKnowledge, None, None).await;

        let first = svc.aggregate(&placement.appearance_id).await.unwrap();
        assert_eq!(first, AggregationReport { votings_created: 1, votes_grouped: 1 });

        let audit_rows = |svc: &TribunalService| {
            let conn = svc.db().conn().clone();
            async move {
                let mut rows = conn
                    .query("SELECT COUNT(*) FROM audit_trail WHERE action = 'grouped'", ())
                    .await
                    .unwrap();
                rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
            }
        };
        let before = audit_rows(&svc).await;
        let second = svc.aggregate(&placement.appearance_id).await.unwrap();
        assert!(second.is_noop());
        assert_eq!(audit_rows(&svc).await, before);
    }

    #[tokio::test]
    async fn votes_join_existing_pending_voting() {
        let svc = test_service().await;
        let placement = seed_placement(&svc).await;
        let a = insert_raw_vote(&svc, &placement.appearance_id, &placement.rapporteur_id, KnowledgeType::NoKnowledge, None, None).await;
        svc.aggregate(&placement.appearance_id).await.unwrap();

        let other = svc
            .create_member("Bruno", trb_core::enums::MemberRole::Voting)
            .await
            .unwrap();
        let b = insert_raw_vote(&svc, &placement.appearance_id, &other.id, KnowledgeType::NoKnowledge, None, None).await;
        let report = svc.aggregate(&placement.appearance_id).await.unwrap();
        assert_eq!(report, AggregationReport { votings_created: 0, votes_grouped: 1 });

        let va = svc.get_vote(&a).await.unwrap().voting_id;
        let vb = svc.get_vote(&b).await.unwrap().voting_id;
        assert!(va.is_some());
        assert_eq!(va, vb);
    }

    #[tokio::test]
    async fn missing_appearance_is_not_found() {
        let svc = test_service().await;
        let result = svc.aggregate("apr-00000000").await;
        assert!(matches!(result, Err(EngineError::NotFound { entity: EntityType::Appearance, .. })));
    }
}
