//! Member repository.

use chrono::Utc;

use trb_core::entities::Member;
use trb_core::enums::{AuditAction, EntityType, MemberRole, TrailOp};
use trb_core::ids::PREFIX_MEMBER;
use trb_core::trail::REGISTRY_SCOPE;

use crate::error::EngineError;
use crate::generate_id;
use crate::helpers::{parse_datetime, parse_enum};
use crate::service::TribunalService;

const SELECT_COLS: &str = "id, name, role, created_at";

fn row_to_member(row: &libsql::Row) -> Result<Member, EngineError> {
    Ok(Member {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        role: parse_enum(&row.get::<String>(2)?)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

impl TribunalService {
    /// Register a board member.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` for a blank name.
    pub async fn create_member(&self, name: &str, role: MemberRole) -> Result<Member, EngineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::Validation("member name must not be empty".into()));
        }
        let now = Utc::now();

        let txn = self.db().begin().await?;
        let result: Result<Member, EngineError> = async {
            let member = Member {
                id: generate_id(txn.conn(), PREFIX_MEMBER).await?,
                name: name.to_string(),
                role,
                created_at: now,
            };
            txn.conn()
                .execute(
                    "INSERT INTO members (id, name, role, created_at) VALUES (?1, ?2, ?3, ?4)",
                    libsql::params![
                        member.id.as_str(),
                        member.name.as_str(),
                        role.as_str(),
                        now.to_rfc3339()
                    ],
                )
                .await?;
            self.audit::<()>(txn.conn(), EntityType::Member, &member.id, AuditAction::Created, None, now)
                .await?;
            Ok(member)
        }
        .await;
        let member = txn.finish(result).await?;

        self.trail_op(REGISTRY_SCOPE, TrailOp::Create, EntityType::Member, &member.id, &member, now);
        tracing::debug!(member_id = %member.id, %role, "member created");
        Ok(member)
    }

    /// # Errors
    ///
    /// Returns `EngineError::NotFound` if no member has this id.
    pub async fn get_member(&self, id: &str) -> Result<Member, EngineError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM members WHERE id = ?1"), [id])
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| EngineError::not_found(EntityType::Member, id))?;
        row_to_member(&row)
    }

    /// List members by name.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the query fails.
    pub async fn list_members(&self, limit: u32) -> Result<Vec<Member>, EngineError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM members ORDER BY name, id LIMIT ?1"),
                [i64::from(limit)],
            )
            .await?;
        let mut members = Vec::new();
        while let Some(row) = rows.next().await? {
            members.push(row_to_member(&row)?);
        }
        Ok(members)
    }
}
