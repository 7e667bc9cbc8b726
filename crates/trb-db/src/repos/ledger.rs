//! Vote ledger.
//!
//! Records individual member votes. Each recorded vote is folded into its
//! voting right away by the aggregator, under the same appearance lock.

use chrono::Utc;

use trb_core::carry::with_reviewer;
use trb_core::entities::{Distribution, Vote};
use trb_core::enums::{
    AppearanceStatus, AuditAction, DecisionType, EntityType, KnowledgeType, TrailOp, VoteRole,
};
use trb_core::ids::PREFIX_VOTE;

use super::catalog::ensure_decision;
use super::distribution::fetch_active_distribution;
use super::status::fetch_appearance;
use crate::error::{EngineError, is_unique_violation};
use crate::generate_id;
use crate::helpers::{ensure_exists, get_opt_string, parse_datetime, parse_enum};
use crate::requests::vote::NewVote;
use crate::retry::with_retry;
use crate::service::TribunalService;

pub(crate) const VOTE_COLS: &str = "v.id, v.appearance_id, v.member_id, v.vote_role, v.knowledge_type, v.preliminary_decision_id, v.merit_decision_id, v.ex_officio_decision_id, v.text, v.voting_id, v.created_at";

/// Parse the first eleven columns selected with [`VOTE_COLS`].
pub(crate) fn row_to_vote(row: &libsql::Row) -> Result<Vote, EngineError> {
    Ok(Vote {
        id: row.get::<String>(0)?,
        appearance_id: row.get::<String>(1)?,
        member_id: row.get::<String>(2)?,
        vote_role: parse_enum(&row.get::<String>(3)?)?,
        knowledge_type: parse_enum(&row.get::<String>(4)?)?,
        preliminary_decision_id: get_opt_string(row, 5)?,
        merit_decision_id: get_opt_string(row, 6)?,
        ex_officio_decision_id: get_opt_string(row, 7)?,
        text: row.get::<String>(8)?,
        voting_id: get_opt_string(row, 9)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

fn duplicate_vote(vote: &NewVote) -> EngineError {
    EngineError::DuplicateVote {
        member_id: vote.member_id.clone(),
        appearance_id: vote.appearance_id.clone(),
    }
}

impl TribunalService {
    /// Record a member's vote on an appearance.
    ///
    /// A reviewer vote adds the member to the appeal's reviewers when it is
    /// not one yet. After the vote is stored the appearance is re-aggregated;
    /// an aggregation failure is logged and does not fail the vote.
    ///
    /// # Errors
    ///
    /// - `Validation` for blank text, a knowledge vote without merit
    ///   decision, or a decision of the wrong type.
    /// - `NotFound` for a missing appearance, member or decision.
    /// - `AppearanceJudged` when the appearance is already judged.
    /// - `DuplicateVote` when the member already cast this vote.
    /// - `RapporteurCannotReview` for a reviewer vote by the rapporteur.
    pub async fn record_vote(&self, new_vote: NewVote) -> Result<Vote, EngineError> {
        new_vote.validate()?;
        let appearance_id = new_vote.appearance_id.as_str();
        let appeal_id = fetch_appearance(self.db().conn(), appearance_id)
            .await?
            .appeal_id;

        let _appearance_guard = self.appearance_locks().lock(appearance_id).await;
        let _appeal_guard = match new_vote.vote_role {
            VoteRole::Reviewer => Some(self.appeal_locks().lock(&appeal_id).await),
            VoteRole::Rapporteur | VoteRole::Member => None,
        };

        let (vote, snapshot, session_id) = with_retry(self.retry_config(), "record_vote", || {
            self.record_vote_once(&new_vote)
        })
        .await?;

        self.trail_op(&session_id, TrailOp::Create, EntityType::Vote, &vote.id, &vote, vote.created_at);
        if let Some(snapshot) = &snapshot {
            self.trail_op(
                &session_id,
                TrailOp::Supersede,
                EntityType::Distribution,
                &snapshot.id,
                snapshot,
                snapshot.created_at,
            );
        }
        tracing::debug!(
            vote_id = %vote.id,
            appearance_id,
            member_id = %vote.member_id,
            knowledge_type = %vote.knowledge_type,
            "vote recorded"
        );

        match self.aggregate_locked(appearance_id).await {
            Ok(report) => {
                tracing::debug!(appearance_id, ?report, "appearance re-aggregated");
            }
            Err(error) => {
                tracing::warn!(appearance_id, vote_id = %vote.id, %error, "aggregation after vote failed");
            }
        }

        self.get_vote(&vote.id).await
    }

    async fn record_vote_once(
        &self,
        new_vote: &NewVote,
    ) -> Result<(Vote, Option<Distribution>, String), EngineError> {
        let now = Utc::now();
        let txn = self.db().begin().await?;
        let result: Result<(Vote, Option<Distribution>, String), EngineError> = async {
            let conn = txn.conn();
            let appearance = fetch_appearance(conn, &new_vote.appearance_id).await?;
            if appearance.status == AppearanceStatus::Judged {
                return Err(EngineError::AppearanceJudged(appearance.id));
            }
            ensure_exists(conn, EntityType::Member, &new_vote.member_id).await?;
            for (id, expected, field) in [
                (&new_vote.preliminary_decision_id, DecisionType::Preliminary, "preliminary_decision_id"),
                (&new_vote.merit_decision_id, DecisionType::Merit, "merit_decision_id"),
                (&new_vote.ex_officio_decision_id, DecisionType::ExOfficio, "ex_officio_decision_id"),
            ] {
                if let Some(id) = id {
                    ensure_decision(conn, id, expected, field).await?;
                }
            }

            let group_key = new_vote.voting_key().group.storage_key();
            let mut existing = match new_vote.knowledge_type {
                KnowledgeType::Knowledge => {
                    conn.query(
                        "SELECT 1 FROM votes WHERE appearance_id = ?1 AND member_id = ?2 AND knowledge_type = 'knowledge'",
                        [new_vote.appearance_id.as_str(), new_vote.member_id.as_str()],
                    )
                    .await?
                }
                KnowledgeType::NoKnowledge => {
                    conn.query(
                        "SELECT 1 FROM votes WHERE appearance_id = ?1 AND member_id = ?2 AND knowledge_type = 'no_knowledge' AND group_key = ?3",
                        [
                            new_vote.appearance_id.as_str(),
                            new_vote.member_id.as_str(),
                            group_key.as_str(),
                        ],
                    )
                    .await?
                }
            };
            if existing.next().await?.is_some() {
                return Err(duplicate_vote(new_vote));
            }

            let snapshot = if new_vote.vote_role == VoteRole::Reviewer {
                let active = fetch_active_distribution(conn, &appearance.appeal_id)
                    .await?
                    .ok_or_else(|| {
                        EngineError::Validation(format!(
                            "appeal {} has no distribution to review",
                            appearance.appeal_id
                        ))
                    })?;
                if active.rapporteur_id == new_vote.member_id {
                    return Err(EngineError::RapporteurCannotReview {
                        member_id: new_vote.member_id.clone(),
                        appeal_id: appearance.appeal_id.clone(),
                    });
                }
                match with_reviewer(&active, &new_vote.member_id) {
                    Some(draft) => Some(
                        self.append_distribution(
                            conn,
                            &appearance.appeal_id,
                            Some(&active),
                            draft,
                            AuditAction::ReviewerAdded,
                            now,
                        )
                        .await?,
                    ),
                    None => None,
                }
            } else {
                None
            };

            let vote = Vote {
                id: generate_id(conn, PREFIX_VOTE).await?,
                appearance_id: new_vote.appearance_id.clone(),
                member_id: new_vote.member_id.clone(),
                vote_role: new_vote.vote_role,
                knowledge_type: new_vote.knowledge_type,
                preliminary_decision_id: new_vote.preliminary_decision_id.clone(),
                merit_decision_id: new_vote.merit_decision_id.clone(),
                ex_officio_decision_id: new_vote.ex_officio_decision_id.clone(),
                text: new_vote.text.trim().to_string(),
                voting_id: None,
                created_at: now,
            };
            conn.execute(
                "INSERT INTO votes (id, appearance_id, member_id, vote_role, knowledge_type,
                                    preliminary_decision_id, merit_decision_id, ex_officio_decision_id,
                                    group_key, text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                libsql::params![
                    vote.id.as_str(),
                    vote.appearance_id.as_str(),
                    vote.member_id.as_str(),
                    vote.vote_role.as_str(),
                    vote.knowledge_type.as_str(),
                    vote.preliminary_decision_id.as_deref(),
                    vote.merit_decision_id.as_deref(),
                    vote.ex_officio_decision_id.as_deref(),
                    group_key.as_str(),
                    vote.text.as_str(),
                    now.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    duplicate_vote(new_vote)
                } else {
                    e.into()
                }
            })?;
            self.audit::<()>(conn, EntityType::Vote, &vote.id, AuditAction::Created, None, now)
                .await?;

            Ok((vote, snapshot, appearance.session_id))
        }
        .await;
        txn.finish(result).await
    }

    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if no vote has this id.
    pub async fn get_vote(&self, id: &str) -> Result<Vote, EngineError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {VOTE_COLS} FROM votes v WHERE v.id = ?1"), [id])
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| EngineError::not_found(EntityType::Vote, id))?;
        row_to_vote(&row)
    }

    /// Every vote cast on an appearance, in the order cast.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if the appearance does not exist.
    pub async fn list_votes(&self, appearance_id: &str) -> Result<Vec<Vote>, EngineError> {
        let conn = self.db().conn();
        ensure_exists(conn, EntityType::Appearance, appearance_id).await?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {VOTE_COLS} FROM votes v WHERE v.appearance_id = ?1 ORDER BY v.created_at, v.rowid"
                ),
                [appearance_id],
            )
            .await?;
        let mut votes = Vec::new();
        while let Some(row) = rows.next().await? {
            votes.push(row_to_vote(&row)?);
        }
        Ok(votes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{
        Placement, seed_decision, seed_member, seed_placement, test_service,
    };
    use trb_core::enums::MemberRole;

    fn merit_vote(placement: &Placement, member_id: &str, merit_id: &str) -> NewVote {
        NewVote::builder(&placement.appearance_id, member_id, KnowledgeType::Knowledge)
            .merit(Some(merit_id.to_string()))
            .text("Dou provimento ao recurso.")
            .build()
    }

    #[tokio::test]
    async fn recorded_vote_is_grouped_immediately() {
        let svc = test_service().await;
        let placement = seed_placement(&svc).await;
        let merit = seed_decision(&svc, DecisionType::Merit, "Provimento").await;

        let vote = svc
            .record_vote(merit_vote(&placement, &placement.rapporteur_id, &merit.id))
            .await
            .unwrap();
        assert!(vote.id.starts_with("vot-"));
        assert!(vote.is_grouped());
        assert_eq!(svc.list_votes(&placement.appearance_id).await.unwrap(), vec![vote]);
    }

    #[tokio::test]
    async fn second_knowledge_vote_is_duplicate() {
        let svc = test_service().await;
        let placement = seed_placement(&svc).await;
        let merit = seed_decision(&svc, DecisionType::Merit, "Provimento").await;
        let other = seed_decision(&svc, DecisionType::Merit, "Improvimento").await;

        svc.record_vote(merit_vote(&placement, &placement.rapporteur_id, &merit.id))
            .await
            .unwrap();
        let dup = svc
            .record_vote(merit_vote(&placement, &placement.rapporteur_id, &other.id))
            .await;
        assert!(matches!(dup, Err(EngineError::DuplicateVote { .. })));
    }

    #[tokio::test]
    async fn no_knowledge_uniqueness_is_per_preliminary_key() {
        let svc = test_service().await;
        let placement = seed_placement(&svc).await;
        let p1 = seed_decision(&svc, DecisionType::Preliminary, "P1").await;
        let member = &placement.rapporteur_id;

        let bare = || {
            NewVote::builder(&placement.appearance_id, member, KnowledgeType::NoKnowledge)
                .text("Não conheço.")
                .build()
        };
        svc.record_vote(bare()).await.unwrap();
        svc.record_vote(
            NewVote::builder(&placement.appearance_id, member, KnowledgeType::NoKnowledge)
                .preliminary(Some(p1.id.clone()))
                .text("Intempestivo.")
                .build(),
        )
        .await
        .unwrap();

        let dup = svc.record_vote(bare()).await;
        assert!(matches!(dup, Err(EngineError::DuplicateVote { .. })));
    }

    #[tokio::test]
    async fn decision_references_are_type_checked() {
        let svc = test_service().await;
        let placement = seed_placement(&svc).await;
        let p1 = seed_decision(&svc, DecisionType::Preliminary, "P1").await;

        let wrong = svc
            .record_vote(merit_vote(&placement, &placement.rapporteur_id, &p1.id))
            .await;
        assert!(matches!(wrong, Err(EngineError::Validation(_))));

        let missing = svc
            .record_vote(merit_vote(&placement, &placement.rapporteur_id, "dec-00000000"))
            .await;
        assert!(matches!(missing, Err(EngineError::NotFound { entity: EntityType::Decision, .. })));
        assert!(svc.list_votes(&placement.appearance_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_member_and_appearance_are_not_found() {
        let svc = test_service().await;
        let placement = seed_placement(&svc).await;
        let merit = seed_decision(&svc, DecisionType::Merit, "Provimento").await;

        let no_member = svc.record_vote(merit_vote(&placement, "mem-00000000", &merit.id)).await;
        assert!(matches!(no_member, Err(EngineError::NotFound { entity: EntityType::Member, .. })));

        let orphan = NewVote::builder("apr-00000000", &placement.rapporteur_id, KnowledgeType::NoKnowledge)
            .text("Não conheço.")
            .build();
        let no_appearance = svc.record_vote(orphan).await;
        assert!(matches!(
            no_appearance,
            Err(EngineError::NotFound { entity: EntityType::Appearance, .. })
        ));
    }

    #[tokio::test]
    async fn reviewer_vote_accrues_reviewer_once() {
        let svc = test_service().await;
        let placement = seed_placement(&svc).await;
        let merit = seed_decision(&svc, DecisionType::Merit, "Provimento").await;
        let p1 = seed_decision(&svc, DecisionType::Preliminary, "P1").await;
        let reviewer = seed_member(&svc, "Revisor", MemberRole::Reviewer).await;

        let mut first = merit_vote(&placement, &reviewer.id, &merit.id);
        first.vote_role = VoteRole::Reviewer;
        svc.record_vote(first).await.unwrap();

        let current = svc.current_distribution(&placement.appeal_id).await.unwrap().unwrap();
        assert_eq!(current.rapporteur_id, placement.rapporteur_id);
        assert_eq!(current.reviewer_ids, vec![reviewer.id.clone()]);
        assert_eq!(current.order, 2);

        // A second reviewer vote by the same member changes nothing.
        let second = NewVote::builder(&placement.appearance_id, &reviewer.id, KnowledgeType::NoKnowledge)
            .role(VoteRole::Reviewer)
            .preliminary(Some(p1.id.clone()))
            .text("Intempestivo.")
            .build();
        svc.record_vote(second).await.unwrap();
        assert_eq!(svc.distribution_history(&placement.appeal_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rapporteur_cannot_vote_as_reviewer() {
        let svc = test_service().await;
        let placement = seed_placement(&svc).await;
        let merit = seed_decision(&svc, DecisionType::Merit, "Provimento").await;

        let mut vote = merit_vote(&placement, &placement.rapporteur_id, &merit.id);
        vote.vote_role = VoteRole::Reviewer;
        let result = svc.record_vote(vote).await;
        assert!(matches!(result, Err(EngineError::RapporteurCannotReview { .. })));
        assert_eq!(svc.distribution_history(&placement.appeal_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn judged_appearance_rejects_votes() {
        let svc = test_service().await;
        let placement = seed_placement(&svc).await;
        svc.db()
            .conn()
            .execute(
                "UPDATE session_appearances SET status = 'judged' WHERE id = ?1",
                [placement.appearance_id.as_str()],
            )
            .await
            .unwrap();
        let vote = NewVote::builder(&placement.appearance_id, &placement.rapporteur_id, KnowledgeType::NoKnowledge)
            .text("Não conheço.")
            .build();
        let result = svc.record_vote(vote).await;
        assert!(matches!(result, Err(EngineError::AppearanceJudged(_))));
    }
}
