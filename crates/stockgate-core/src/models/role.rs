//! Role domain model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{SUB_ADMIN, SUPER_ADMIN};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    /// Unique, normalized to trimmed lowercase.
    pub name: String,
    pub description: String,
    pub permissions: BTreeSet<String>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn is_super_admin(&self) -> bool {
        self.name == SUPER_ADMIN
    }

    pub fn is_sub_admin(&self) -> bool {
        self.name == SUB_ADMIN
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub description: String,
    pub permissions: BTreeSet<String>,
}

/// Partial update. `permissions`, when provided, fully replaces the
/// existing set — it is never merged.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateRole {
    pub name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<BTreeSet<String>>,
}

/// Normalization applied to role names before any store operation.
pub fn normalize_role_name(name: &str) -> String {
    name.trim().to_lowercase()
}
