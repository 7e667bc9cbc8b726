//! Audit trail repository.
//!
//! Append-only audit entries recording every mutation, with dynamic filtering.

use trb_core::entities::AuditEntry;
use trb_core::enums::{AuditAction, EntityType};

use crate::error::EngineError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_json};
use crate::service::TribunalService;

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub actor_id: Option<String>,
    pub limit: Option<u32>,
}

fn row_to_audit(row: &libsql::Row) -> Result<AuditEntry, EngineError> {
    Ok(AuditEntry {
        id: row.get::<String>(0)?,
        actor_id: get_opt_string(row, 1)?,
        entity_type: parse_enum(&row.get::<String>(2)?)?,
        entity_id: row.get::<String>(3)?,
        action: parse_enum(&row.get::<String>(4)?)?,
        detail: parse_optional_json(get_opt_string(row, 5)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

impl TribunalService {
    /// Append an audit entry on `conn`. Called by every mutation.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the INSERT fails.
    pub(crate) async fn append_audit(
        &self,
        conn: &libsql::Connection,
        entry: &AuditEntry,
    ) -> Result<(), EngineError> {
        conn.execute(
            "INSERT INTO audit_trail (id, actor_id, entity_type, entity_id, action, detail, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            libsql::params![
                entry.id.as_str(),
                entry.actor_id.as_deref(),
                entry.entity_type.as_str(),
                entry.entity_id.as_str(),
                entry.action.as_str(),
                entry.detail.as_ref().map(std::string::ToString::to_string),
                entry.created_at.to_rfc3339()
            ],
        )
        .await?;
        Ok(())
    }

    /// Query audit entries with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, EngineError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(et) = filter.entity_type {
            params.push(libsql::Value::Text(et.as_str().to_string()));
            conditions.push(format!("entity_type = ?{}", params.len()));
        }
        if let Some(ref eid) = filter.entity_id {
            params.push(libsql::Value::Text(eid.clone()));
            conditions.push(format!("entity_id = ?{}", params.len()));
        }
        if let Some(action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("action = ?{}", params.len()));
        }
        if let Some(ref actor) = filter.actor_id {
            params.push(libsql::Value::Text(actor.clone()));
            conditions.push(format!("actor_id = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT id, actor_id, entity_type, entity_id, action, detail, created_at
             FROM audit_trail {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_audit(&row)?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_member, test_service, test_service_as};
    use trb_core::enums::MemberRole;

    #[tokio::test]
    async fn mutations_are_audited_with_actor() {
        let svc = test_service_as("mem-chair").await;
        let member = seed_member(&svc, "Ana", MemberRole::Rapporteur).await;

        let entries = svc
            .query_audit(&AuditFilter {
                entity_type: Some(EntityType::Member),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entity_id, member.id);
        assert_eq!(entries[0].action, AuditAction::Created);
        assert_eq!(entries[0].actor_id.as_deref(), Some("mem-chair"));
    }

    #[tokio::test]
    async fn filters_combine() {
        let svc = test_service().await;
        let ana = seed_member(&svc, "Ana", MemberRole::Rapporteur).await;
        seed_member(&svc, "Bruno", MemberRole::Voting).await;

        let all = svc.query_audit(&AuditFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|e| e.actor_id.is_none()));

        let only_ana = svc
            .query_audit(&AuditFilter {
                entity_id: Some(ana.id.clone()),
                action: Some(AuditAction::Created),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(only_ana.len(), 1);

        let none = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Closed),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty());

        let limited = svc
            .query_audit(&AuditFilter {
                limit: Some(1),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }
}
