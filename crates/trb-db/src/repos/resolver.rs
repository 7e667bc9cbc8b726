//! Voting resolver.
//!
//! Closes a voting exactly once with the outcome announced by the chair,
//! and lists votings with their labels and nested votes.

use chrono::Utc;

use trb_core::audit_detail::VotingClosedDetail;
use trb_core::entities::Voting;
use trb_core::enums::{AuditAction, EntityType, TrailOp, VotingStatus};
use trb_core::grouping::voting_label;
use trb_core::responses::{VoteView, VotingView};
use trb_core::tally::resolve_quality_vote;

use super::ledger::{VOTE_COLS, row_to_vote};
use super::status::fetch_appearance;
use crate::error::EngineError;
use crate::helpers::{
    ensure_exists, get_bool, get_opt_string, non_blank, parse_datetime, parse_enum,
    parse_optional_datetime,
};
use crate::requests::voting::CloseVoting;
use crate::service::TribunalService;

const SELECT_COLS: &str = "g.id, g.appearance_id, g.voting_type, g.preliminary_decision_id, g.status, g.winning_vote_id, g.winning_member_id, g.quality_vote_used, g.quality_vote_member_id, g.final_text, g.total_votes, g.votes_in_favor, g.votes_against, g.abstentions, g.created_at, g.closed_at";

fn row_to_voting(row: &libsql::Row) -> Result<Voting, EngineError> {
    Ok(Voting {
        id: row.get::<String>(0)?,
        appearance_id: row.get::<String>(1)?,
        voting_type: parse_enum(&row.get::<String>(2)?)?,
        preliminary_decision_id: get_opt_string(row, 3)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        winning_vote_id: get_opt_string(row, 5)?,
        winning_member_id: get_opt_string(row, 6)?,
        quality_vote_used: get_bool(row, 7)?,
        quality_vote_member_id: get_opt_string(row, 8)?,
        final_text: get_opt_string(row, 9)?,
        total_votes: row.get::<i64>(10)?,
        votes_in_favor: row.get::<i64>(11)?,
        votes_against: row.get::<i64>(12)?,
        abstentions: row.get::<i64>(13)?,
        created_at: parse_datetime(&row.get::<String>(14)?)?,
        closed_at: parse_optional_datetime(get_opt_string(row, 15)?.as_deref())?,
    })
}

async fn fetch_voting(conn: &libsql::Connection, id: &str) -> Result<Voting, EngineError> {
    let mut rows = conn
        .query(&format!("SELECT {SELECT_COLS} FROM votings g WHERE g.id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| EngineError::VotingNotFound(id.to_string()))?;
    row_to_voting(&row)
}

async fn fetch_vote_views(
    conn: &libsql::Connection,
    voting_id: &str,
) -> Result<Vec<VoteView>, EngineError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {VOTE_COLS}, m.name, p.identifier, md.identifier, e.identifier
                 FROM votes v
                 JOIN members m ON m.id = v.member_id
                 LEFT JOIN decisions p ON p.id = v.preliminary_decision_id
                 LEFT JOIN decisions md ON md.id = v.merit_decision_id
                 LEFT JOIN decisions e ON e.id = v.ex_officio_decision_id
                 WHERE v.voting_id = ?1
                 ORDER BY v.created_at, v.rowid"
            ),
            [voting_id],
        )
        .await?;
    let mut views = Vec::new();
    while let Some(row) = rows.next().await? {
        views.push(VoteView {
            vote: row_to_vote(&row)?,
            member_name: row.get::<String>(11)?,
            preliminary_identifier: get_opt_string(&row, 12)?,
            merit_identifier: get_opt_string(&row, 13)?,
            ex_officio_identifier: get_opt_string(&row, 14)?,
        });
    }
    Ok(views)
}

impl TribunalService {
    /// Close a pending voting with the chair's outcome.
    ///
    /// The winner must have voted in this voting. The casting vote may only
    /// break a tie; when it is not used any member id sent with it is
    /// dropped. The final text defaults to the winning vote's text.
    ///
    /// # Errors
    ///
    /// - `VotingNotFound` / `AlreadyClosed`.
    /// - `Validation` for a bad tally or a casting vote without a member.
    /// - `WinnerNotAParticipant` when the winner cast no vote here.
    /// - `QualityVoteWithoutTie` when the casting vote is used on an untied tally.
    pub async fn close_voting(&self, voting_id: &str, request: CloseVoting) -> Result<Voting, EngineError> {
        let winning_member_id = request.winning_member_id.trim().to_string();
        if winning_member_id.is_empty() {
            return Err(EngineError::Validation("winning_member_id is required".into()));
        }
        let appearance_id = fetch_voting(self.db().conn(), voting_id).await?.appearance_id;

        let _appearance_guard = self.appearance_locks().lock(&appearance_id).await;
        let now = Utc::now();

        let txn = self.db().begin().await?;
        let result: Result<(Voting, String), EngineError> = async {
            let conn = txn.conn();
            let voting = fetch_voting(conn, voting_id).await?;
            if voting.status == VotingStatus::Closed {
                return Err(EngineError::AlreadyClosed(voting_id.to_string()));
            }
            request.tally.validate()?;

            let mut rows = conn
                .query(
                    "SELECT id, text FROM votes WHERE voting_id = ?1 AND member_id = ?2
                     ORDER BY created_at, rowid LIMIT 1",
                    [voting_id, winning_member_id.as_str()],
                )
                .await?;
            let winner = rows.next().await?.ok_or_else(|| EngineError::WinnerNotAParticipant {
                voting_id: voting_id.to_string(),
                member_id: winning_member_id.clone(),
            })?;
            let winning_vote_id = winner.get::<String>(0)?;
            let winning_text = winner.get::<String>(1)?;

            let quality_vote_member_id = resolve_quality_vote(
                request.quality_vote_used,
                request.quality_vote_member_id.as_deref(),
                &request.tally,
            )?;
            if let Some(member_id) = quality_vote_member_id.as_deref() {
                ensure_exists(conn, EntityType::Member, member_id).await?;
            }
            let final_text = non_blank(request.final_text.as_deref()).unwrap_or(winning_text);

            let tally = request.tally;
            let updated = conn
                .execute(
                    "UPDATE votings
                     SET status = 'closed', winning_vote_id = ?1, winning_member_id = ?2,
                         quality_vote_used = ?3, quality_vote_member_id = ?4, final_text = ?5,
                         total_votes = ?6, votes_in_favor = ?7, votes_against = ?8, abstentions = ?9,
                         closed_at = ?10
                     WHERE id = ?11 AND status = 'pending'",
                    libsql::params![
                        winning_vote_id.as_str(),
                        winning_member_id.as_str(),
                        i64::from(request.quality_vote_used),
                        quality_vote_member_id.as_deref(),
                        final_text.as_str(),
                        tally.total_votes,
                        tally.votes_in_favor,
                        tally.votes_against,
                        tally.abstentions,
                        now.to_rfc3339(),
                        voting_id
                    ],
                )
                .await?;
            if updated == 0 {
                return Err(EngineError::AlreadyClosed(voting_id.to_string()));
            }

            let detail = VotingClosedDetail {
                winning_member_id: winning_member_id.clone(),
                winning_vote_id,
                quality_vote_member_id,
            };
            self.audit(conn, EntityType::Voting, voting_id, AuditAction::Closed, Some(&detail), now)
                .await?;

            let session_id = fetch_appearance(conn, &voting.appearance_id).await?.session_id;
            Ok((fetch_voting(conn, voting_id).await?, session_id))
        }
        .await;
        let (voting, session_id) = txn.finish(result).await?;

        self.trail_op(&session_id, TrailOp::Close, EntityType::Voting, voting_id, &voting, now);
        tracing::debug!(
            voting_id,
            winning_member_id = %winning_member_id,
            quality_vote_used = voting.quality_vote_used,
            "voting closed"
        );
        Ok(voting)
    }

    /// # Errors
    ///
    /// Returns `EngineError::VotingNotFound` if no voting has this id.
    pub async fn get_voting(&self, id: &str) -> Result<Voting, EngineError> {
        fetch_voting(self.db().conn(), id).await
    }

    /// Every voting of an appearance with its label and votes, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if the appearance does not exist.
    pub async fn list_votings(&self, appearance_id: &str) -> Result<Vec<VotingView>, EngineError> {
        let conn = self.db().conn();
        ensure_exists(conn, EntityType::Appearance, appearance_id).await?;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {SELECT_COLS}, p.identifier
                     FROM votings g
                     LEFT JOIN decisions p ON p.id = g.preliminary_decision_id
                     WHERE g.appearance_id = ?1
                     ORDER BY g.created_at, g.rowid"
                ),
                [appearance_id],
            )
            .await?;
        let mut votings = Vec::new();
        while let Some(row) = rows.next().await? {
            let voting = row_to_voting(&row)?;
            let label = voting_label(voting.voting_type, get_opt_string(&row, 16)?.as_deref());
            votings.push((voting, label));
        }

        let mut views = Vec::with_capacity(votings.len());
        for (voting, label) in votings {
            let votes = fetch_vote_views(conn, &voting.id).await?;
            views.push(VotingView {
                voting,
                label,
                votes,
            });
        }
        Ok(views)
    }
}
