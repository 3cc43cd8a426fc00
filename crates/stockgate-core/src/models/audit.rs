//! Audit log domain model.
//!
//! Entries are immutable once created; the application never updates
//! or deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Restore,
    Login,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::Restore => "RESTORE",
            AuditAction::Login => "LOGIN",
        }
    }
}

/// Transport-provided request context captured alongside a mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub action: AuditAction,
    /// Free-form resource name, e.g. `Product`, `User`, `Role`.
    pub entity_type: String,
    pub entity_id: Uuid,
    pub performed_by: Uuid,
    /// Snapshot of the entity before the change, if any.
    pub old_value: Option<serde_json::Value>,
    /// Snapshot of the entity after the change, if any.
    pub new_value: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditLogEntry {
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub performed_by: Uuid,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub context: RequestContext,
}
