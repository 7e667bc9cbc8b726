//! Decision catalog.
//!
//! Reference data naming every preliminary, merit and ex-officio decision a
//! vote can point at. The engine only reads it; `create_decision` exists to
//! seed the catalog.

use chrono::Utc;

use trb_core::entities::Decision;
use trb_core::enums::{AuditAction, DecisionType, EntityType, TrailOp};
use trb_core::ids::PREFIX_DECISION;
use trb_core::trail::REGISTRY_SCOPE;

use crate::error::{EngineError, is_unique_violation};
use crate::generate_id;
use crate::helpers::{get_opt_string, non_blank, parse_enum};
use crate::service::TribunalService;

const SELECT_COLS: &str = "id, decision_type, identifier, accept_text, reject_text, body_text";

fn row_to_decision(row: &libsql::Row) -> Result<Decision, EngineError> {
    Ok(Decision {
        id: row.get::<String>(0)?,
        decision_type: parse_enum(&row.get::<String>(1)?)?,
        identifier: row.get::<String>(2)?,
        accept_text: get_opt_string(row, 3)?,
        reject_text: get_opt_string(row, 4)?,
        body_text: get_opt_string(row, 5)?,
    })
}

/// Fetch a decision and check it is of the expected type.
///
/// `field` names the vote field that referenced it, for the error message.
pub(crate) async fn ensure_decision(
    conn: &libsql::Connection,
    id: &str,
    expected: DecisionType,
    field: &str,
) -> Result<Decision, EngineError> {
    let mut rows = conn
        .query(&format!("SELECT {SELECT_COLS} FROM decisions WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| EngineError::not_found(EntityType::Decision, id))?;
    let decision = row_to_decision(&row)?;
    if decision.decision_type != expected {
        return Err(EngineError::Validation(format!(
            "{field} must reference a {expected} decision, but {id} is {}",
            decision.decision_type
        )));
    }
    Ok(decision)
}

impl TribunalService {
    /// Add a decision to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` for a blank identifier or when the
    /// catalog already has a decision of this type with this identifier.
    pub async fn create_decision(
        &self,
        decision_type: DecisionType,
        identifier: &str,
        accept_text: Option<&str>,
        reject_text: Option<&str>,
        body_text: Option<&str>,
    ) -> Result<Decision, EngineError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(EngineError::Validation("decision identifier must not be empty".into()));
        }
        let now = Utc::now();

        let txn = self.db().begin().await?;
        let result: Result<Decision, EngineError> = async {
            let decision = Decision {
                id: generate_id(txn.conn(), PREFIX_DECISION).await?,
                decision_type,
                identifier: identifier.to_string(),
                accept_text: non_blank(accept_text),
                reject_text: non_blank(reject_text),
                body_text: non_blank(body_text),
            };
            txn.conn()
                .execute(
                    "INSERT INTO decisions (id, decision_type, identifier, accept_text, reject_text, body_text)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    libsql::params![
                        decision.id.as_str(),
                        decision_type.as_str(),
                        decision.identifier.as_str(),
                        decision.accept_text.as_deref(),
                        decision.reject_text.as_deref(),
                        decision.body_text.as_deref()
                    ],
                )
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        EngineError::Validation(format!(
                            "a {decision_type} decision named '{identifier}' already exists"
                        ))
                    } else {
                        e.into()
                    }
                })?;
            self.audit::<()>(txn.conn(), EntityType::Decision, &decision.id, AuditAction::Created, None, now)
                .await?;
            Ok(decision)
        }
        .await;
        let decision = txn.finish(result).await?;

        self.trail_op(REGISTRY_SCOPE, TrailOp::Create, EntityType::Decision, &decision.id, &decision, now);
        tracing::debug!(decision_id = %decision.id, %decision_type, "decision created");
        Ok(decision)
    }

    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if no decision has this id.
    pub async fn get_decision(&self, id: &str) -> Result<Decision, EngineError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM decisions WHERE id = ?1"), [id])
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| EngineError::not_found(EntityType::Decision, id))?;
        row_to_decision(&row)
    }

    /// List catalog entries, optionally of one type, by identifier.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the query fails.
    pub async fn list_decisions(
        &self,
        decision_type: Option<DecisionType>,
    ) -> Result<Vec<Decision>, EngineError> {
        let mut rows = match decision_type {
            Some(dt) => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {SELECT_COLS} FROM decisions WHERE decision_type = ?1 ORDER BY identifier"
                        ),
                        [dt.as_str()],
                    )
                    .await?
            }
            None => {
                self.db()
                    .conn()
                    .query(
                        &format!("SELECT {SELECT_COLS} FROM decisions ORDER BY decision_type, identifier"),
                        (),
                    )
                    .await?
            }
        };
        let mut decisions = Vec::new();
        while let Some(row) = rows.next().await? {
            decisions.push(row_to_decision(&row)?);
        }
        Ok(decisions)
    }
}
