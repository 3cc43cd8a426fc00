//! SurrealDB implementation of [`AuditLogRepository`].
//!
//! Append-only: the schema forbids UPDATE and DELETE on the table,
//! and this repository exposes neither.

use chrono::{DateTime, Utc};
use stockgate_core::audit::QUERY_LIMIT;
use stockgate_core::error::{StockgateError, StockgateResult};
use stockgate_core::models::audit::{AuditAction, AuditLogEntry, CreateAuditLogEntry};
use stockgate_core::repository::{AuditLogRepository, AuditQuery};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct AuditRow {
    record_id: String,
    action: String,
    entity_type: String,
    entity_id: String,
    performed_by: String,
    old_value: Option<serde_json::Value>,
    new_value: Option<serde_json::Value>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
}

fn parse_action(s: &str) -> Result<AuditAction, DbError> {
    match s {
        "CREATE" => Ok(AuditAction::Create),
        "UPDATE" => Ok(AuditAction::Update),
        "DELETE" => Ok(AuditAction::Delete),
        "RESTORE" => Ok(AuditAction::Restore),
        "LOGIN" => Ok(AuditAction::Login),
        other => Err(DbError::Migration(format!("unknown audit action: {other}"))),
    }
}

impl AuditRow {
    fn try_into_entry(self) -> Result<AuditLogEntry, DbError> {
        let parse = |field: &str, value: &str| {
            Uuid::parse_str(value)
                .map_err(|e| DbError::Migration(format!("invalid {field} UUID: {e}")))
        };
        Ok(AuditLogEntry {
            id: parse("record", &self.record_id)?,
            action: parse_action(&self.action)?,
            entity_type: self.entity_type,
            entity_id: parse("entity", &self.entity_id)?,
            performed_by: parse("performer", &self.performed_by)?,
            old_value: self.old_value,
            new_value: self.new_value,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the audit log store.
#[derive(Clone)]
pub struct SurrealAuditLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAuditLogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AuditLogRepository for SurrealAuditLogRepository<C> {
    async fn append(&self, input: CreateAuditLogEntry) -> StockgateResult<AuditLogEntry> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('audit_log', $id) SET \
                 action = $action, entity_type = $entity_type, \
                 entity_id = $entity_id, performed_by = $performed_by, \
                 old_value = $old_value, new_value = $new_value, \
                 ip_address = $ip_address, user_agent = $user_agent",
            )
            .bind(("id", id_str.clone()))
            .bind(("action", input.action.as_str()))
            .bind(("entity_type", input.entity_type))
            .bind(("entity_id", input.entity_id.to_string()))
            .bind(("performed_by", input.performed_by.to_string()))
            .bind(("old_value", input.old_value))
            .bind(("new_value", input.new_value))
            .bind(("ip_address", input.context.ip_address))
            .bind(("user_agent", input.context.user_agent))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| StockgateError::Persistence(e.to_string()))?;

        // Re-read with the aliased record id so the returned entry
        // carries its generated id.
        let mut read = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('audit_log', $id)",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<AuditRow> = read.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or(DbError::NotFound {
            entity: "audit_log".into(),
            id: id_str,
        })?;

        Ok(row.try_into_entry()?)
    }

    async fn query(&self, filter: AuditQuery) -> StockgateResult<Vec<AuditLogEntry>> {
        let mut conditions = Vec::new();
        if filter.entity_type.is_some() {
            conditions.push("entity_type = $entity_type");
        }
        if filter.entity_id.is_some() {
            conditions.push("entity_id = $entity_id");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {} ", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM audit_log \
             {where_clause}ORDER BY created_at DESC LIMIT $limit",
        );

        let mut builder = self.db.query(&query).bind(("limit", QUERY_LIMIT as u64));
        if let Some(entity_type) = filter.entity_type {
            builder = builder.bind(("entity_type", entity_type));
        }
        if let Some(entity_id) = filter.entity_id {
            builder = builder.bind(("entity_id", entity_id.to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<AuditRow> = result.take(0).map_err(DbError::from)?;
        let entries = rows
            .into_iter()
            .map(|row| row.try_into_entry())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(entries)
    }
}
