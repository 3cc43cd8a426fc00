//! User domain model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserStatus {
    Active,
    Suspended,
}

/// A user's role reference.
///
/// Users store the role's id, not the role itself; many users share
/// one role and deactivating a role does not cascade to its users.
/// The user store resolves the reference by lookup at read time. A
/// reference left `Unresolved` (the role record no longer exists)
/// contributes no role permissions to authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RoleRef {
    Unresolved(Uuid),
    Resolved(Box<Role>),
}

impl RoleRef {
    pub fn id(&self) -> Uuid {
        match self {
            RoleRef::Unresolved(id) => *id,
            RoleRef::Resolved(role) => role.id,
        }
    }

    /// The resolved role, if resolution succeeded.
    pub fn role(&self) -> Option<&Role> {
        match self {
            RoleRef::Unresolved(_) => None,
            RoleRef::Resolved(role) => Some(role),
        }
    }

    /// The resolved role's name, if any.
    pub fn name(&self) -> Option<&str> {
        self.role().map(|r| r.name.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Unique, normalized to trimmed lowercase.
    pub email: String,
    pub role: RoleRef,
    /// Permissions granted on top of the role.
    pub custom_permissions: BTreeSet<String>,
    /// Permissions explicitly taken away. Deny always wins, even over
    /// super-admin authority.
    pub denied_permissions: BTreeSet<String>,
    pub status: UserStatus,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_super_admin(&self) -> bool {
        self.role.role().is_some_and(Role::is_super_admin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    /// Raw password; hashed with Argon2id before persistence and never
    /// stored or returned in plaintext.
    pub password: String,
    pub role_id: Uuid,
}

/// Partial update. The override lists, when provided, fully replace
/// the stored ones.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<Uuid>,
    pub custom_permissions: Option<BTreeSet<String>>,
    pub denied_permissions: Option<BTreeSet<String>>,
    pub status: Option<UserStatus>,
}

/// Stored credential, fetched explicitly for authentication only.
/// Default user reads never include the hash.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user_id: Uuid,
    pub password_hash: String,
}
