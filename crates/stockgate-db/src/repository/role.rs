//! SurrealDB implementation of [`RoleRepository`].
//!
//! Write operations enforce the catalog invariant (every assigned
//! permission must be a valid token) and the protection invariant on
//! the built-in `super_admin` role, which can neither be deleted nor
//! renamed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use stockgate_core::catalog::PermissionCatalog;
use stockgate_core::error::{StockgateError, StockgateResult};
use stockgate_core::models::role::{CreateRole, Role, UpdateRole, normalize_role_name};
use stockgate_core::repository::RoleRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct RoleRow {
    name: String,
    description: String,
    permissions: Vec<String>,
    is_active: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct RoleRowWithId {
    record_id: String,
    name: String,
    description: String,
    permissions: Vec<String>,
    is_active: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoleRow {
    fn into_role(self, id: Uuid) -> Role {
        Role {
            id,
            name: self.name,
            description: self.description,
            permissions: self.permissions.into_iter().collect(),
            is_active: self.is_active,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl RoleRowWithId {
    fn try_into_role(self) -> Result<Role, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(Role {
            id,
            name: self.name,
            description: self.description,
            permissions: self.permissions.into_iter().collect(),
            is_active: self.is_active,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Role store.
#[derive(Clone)]
pub struct SurrealRoleRepository<C: Connection> {
    db: Surreal<C>,
    catalog: Arc<PermissionCatalog>,
}

impl<C: Connection> SurrealRoleRepository<C> {
    pub fn new(db: Surreal<C>, catalog: Arc<PermissionCatalog>) -> Self {
        Self { db, catalog }
    }

    /// Whether any role (active or soft-deleted) other than
    /// `exclude_id` already uses `name`.
    async fn name_taken(&self, name: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM role WHERE name = $name")
            .bind(("name", name.to_string()))
            .await?;
        let rows: Vec<RoleRowWithId> = result.take(0)?;
        let exclude = exclude_id.map(|id| id.to_string());
        Ok(rows
            .iter()
            .any(|row| Some(&row.record_id) != exclude.as_ref()))
    }

    async fn fetch(&self, id: Uuid) -> Result<Role, DbError> {
        let id_str = id.to_string();
        let mut result = self
            .db
            .query("SELECT * FROM type::record('role', $id)")
            .bind(("id", id_str.clone()))
            .await?;
        let rows: Vec<RoleRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or(DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;
        Ok(row.into_role(id))
    }
}

impl<C: Connection> RoleRepository for SurrealRoleRepository<C> {
    async fn create(&self, input: CreateRole) -> StockgateResult<Role> {
        let name = normalize_role_name(&input.name);
        if name.is_empty() {
            return Err(StockgateError::validation("role name must not be empty"));
        }
        self.catalog.validate(&input.permissions)?;

        if self.name_taken(&name, None).await.map_err(DbError::from)? {
            return Err(StockgateError::duplicate("role", "name"));
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let permissions: Vec<String> = input.permissions.into_iter().collect();

        let result = self
            .db
            .query(
                "CREATE type::record('role', $id) SET \
                 name = $name, description = $description, \
                 permissions = $permissions, is_active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", name))
            .bind(("description", input.description))
            .bind(("permissions", permissions))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| StockgateError::Persistence(e.to_string()))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.into_role(id))
    }

    async fn get_by_id(&self, id: Uuid) -> StockgateResult<Role> {
        Ok(self.fetch(id).await?)
    }

    async fn get_by_name(&self, name: &str) -> StockgateResult<Role> {
        let name = normalize_role_name(name);
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM role WHERE name = $name")
            .bind(("name", name.clone()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or(DbError::NotFound {
            entity: "role".into(),
            id: name,
        })?;
        Ok(row.try_into_role()?)
    }

    async fn update(&self, id: Uuid, input: UpdateRole) -> StockgateResult<Role> {
        let existing = self.fetch(id).await?;

        let new_name = input.name.as_deref().map(normalize_role_name);
        if let Some(ref name) = new_name {
            if name.is_empty() {
                return Err(StockgateError::validation("role name must not be empty"));
            }
            if existing.is_super_admin() && *name != existing.name {
                return Err(StockgateError::protected(
                    "the super_admin role cannot be renamed",
                ));
            }
            if *name != existing.name && self.name_taken(name, Some(id)).await.map_err(DbError::from)? {
                return Err(StockgateError::duplicate("role", "name"));
            }
        }
        if let Some(ref permissions) = input.permissions {
            self.catalog.validate(permissions)?;
        }

        let mut sets = Vec::new();
        if new_name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.permissions.is_some() {
            sets.push("permissions = $permissions");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('role', $id) SET {}",
            sets.join(", ")
        );

        let id_str = id.to_string();
        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = new_name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(permissions) = input.permissions {
            let permissions: Vec<String> = permissions.into_iter().collect();
            builder = builder.bind(("permissions", permissions));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| StockgateError::Persistence(e.to_string()))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.into_role(id))
    }

    async fn soft_delete(&self, id: Uuid) -> StockgateResult<()> {
        let existing = self.fetch(id).await?;
        if existing.is_super_admin() {
            return Err(StockgateError::protected(
                "the super_admin role cannot be deleted",
            ));
        }

        // Single UPDATE: readers see either the fully-active or the
        // fully-deactivated role, never a partial state.
        self.db
            .query(
                "UPDATE type::record('role', $id) SET \
                 is_active = false, deleted_at = time::now(), \
                 updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| StockgateError::Persistence(e.to_string()))?;

        Ok(())
    }

    async fn list(&self) -> StockgateResult<Vec<Role>> {
        // `!= false` rather than `== true`: records predating the
        // is_active field count as active.
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 WHERE is_active != false ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;
        let roles = rows
            .into_iter()
            .map(|row| row.try_into_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(roles)
    }
}
