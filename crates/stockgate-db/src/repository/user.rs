//! SurrealDB implementation of [`UserRepository`].
//!
//! Passwords are hashed with Argon2id (random salt per hash) before
//! persistence. The credential field is omitted from every default
//! read; only [`UserRepository::get_credentials`] fetches it, for the
//! authentication collaborator.
//!
//! Users store their role by id. Reads resolve the reference by
//! lookup; a reference whose role record is missing stays unresolved
//! rather than failing the read.

use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use stockgate_core::catalog::{PermissionCatalog, SUB_ADMIN, SUPER_ADMIN};
use stockgate_core::error::{StockgateError, StockgateResult};
use stockgate_core::models::role::Role;
use stockgate_core::models::user::{
    CreateUser, Credentials, RoleRef, UpdateUser, User, UserStatus,
};
use stockgate_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct UserRow {
    name: String,
    email: String,
    role_id: String,
    custom_permissions: Vec<String>,
    denied_permissions: Vec<String>,
    status: String,
    is_active: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    name: String,
    email: String,
    role_id: String,
    custom_permissions: Vec<String>,
    denied_permissions: Vec<String>,
    status: String,
    is_active: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CredentialsRow {
    record_id: String,
    password_hash: String,
}

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

fn parse_status(s: &str) -> Result<UserStatus, DbError> {
    match s {
        "Active" => Ok(UserStatus::Active),
        "Suspended" => Ok(UserStatus::Suspended),
        other => Err(DbError::Migration(format!("unknown user status: {other}"))),
    }
}

fn status_to_string(s: &UserStatus) -> &'static str {
    match s {
        UserStatus::Active => "Active",
        UserStatus::Suspended => "Suspended",
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String, StockgateError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StockgateError::Persistence(format!("password hashing failed: {e}")))
}

impl UserRow {
    fn into_user(self, id: Uuid, role: RoleRef) -> Result<User, DbError> {
        Ok(User {
            id,
            name: self.name,
            email: self.email,
            role,
            custom_permissions: self.custom_permissions.into_iter().collect(),
            denied_permissions: self.denied_permissions.into_iter().collect(),
            status: parse_status(&self.status)?,
            is_active: self.is_active,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self, role: RoleRef) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(User {
            id,
            name: self.name,
            email: self.email,
            role,
            custom_permissions: self.custom_permissions.into_iter().collect(),
            denied_permissions: self.denied_permissions.into_iter().collect(),
            status: parse_status(&self.status)?,
            is_active: self.is_active,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the User store.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    catalog: Arc<PermissionCatalog>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>, catalog: Arc<PermissionCatalog>) -> Self {
        Self { db, catalog }
    }

    async fn email_taken(&self, email: &str, exclude_id: Option<Uuid>) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, password_hash \
                 FROM user WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await?;
        let rows: Vec<CredentialsRow> = result.take(0)?;
        let exclude = exclude_id.map(|id| id.to_string());
        Ok(rows
            .iter()
            .any(|row| Some(&row.record_id) != exclude.as_ref()))
    }

    /// Resolve a stored role id. A missing role record yields an
    /// unresolved reference, never an error — deactivating or losing
    /// a role must not break reads of its users.
    async fn resolve_role(&self, role_id: &str) -> Result<RoleRef, DbError> {
        let id = Uuid::parse_str(role_id)
            .map_err(|e| DbError::Migration(format!("invalid role UUID: {e}")))?;
        let mut result = self
            .db
            .query("SELECT * FROM type::record('role', $id)")
            .bind(("id", role_id.to_string()))
            .await?;
        let rows: Vec<RoleRow> = result.take(0)?;
        Ok(match rows.into_iter().next() {
            Some(row) => RoleRef::Resolved(Box::new(Role {
                id,
                name: row.name,
                description: row.description,
                permissions: row.permissions.into_iter().collect(),
                is_active: row.is_active,
                deleted_at: row.deleted_at,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })),
            None => RoleRef::Unresolved(id),
        })
    }

    /// Assert that a role id references an existing role before it is
    /// assigned to a user.
    async fn assert_role_exists(&self, role_id: Uuid) -> Result<(), DbError> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('role', $id)")
            .bind(("id", role_id.to_string()))
            .await?;
        let rows: Vec<RoleRow> = result.take(0)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "role".into(),
                id: role_id.to_string(),
            });
        }
        Ok(())
    }

    async fn fetch_row(&self, id: Uuid) -> Result<UserRow, DbError> {
        let id_str = id.to_string();
        let mut result = self
            .db
            .query("SELECT * OMIT password_hash FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await?;
        let rows: Vec<UserRow> = result.take(0)?;
        rows.into_iter().next().ok_or(DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> StockgateResult<User> {
        let email = normalize_email(&input.email);
        if email.is_empty() {
            return Err(StockgateError::validation("email must not be empty"));
        }
        if input.password.is_empty() {
            return Err(StockgateError::validation("password must not be empty"));
        }
        self.assert_role_exists(input.role_id).await?;

        if self.email_taken(&email, None).await.map_err(DbError::from)? {
            return Err(StockgateError::duplicate("user", "email"));
        }

        let password_hash = hash_password(&input.password)?;
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 name = $name, email = $email, \
                 password_hash = $password_hash, role_id = $role_id, \
                 custom_permissions = [], denied_permissions = [], \
                 status = 'Active', is_active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("email", email))
            .bind(("password_hash", password_hash))
            .bind(("role_id", input.role_id.to_string()))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| StockgateError::Persistence(e.to_string()))?;

        // Re-read through the default projection so the credential
        // field never leaves this function.
        let row = self.fetch_row(id).await?;
        let role = self.resolve_role(&row.role_id).await?;
        Ok(row.into_user(id, role)?)
    }

    async fn get_by_id(&self, id: Uuid) -> StockgateResult<User> {
        let row = self.fetch_row(id).await?;
        let role = self.resolve_role(&row.role_id).await?;
        Ok(row.into_user(id, role)?)
    }

    async fn get_by_email(&self, email: &str) -> StockgateResult<User> {
        let email = normalize_email(email);
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * OMIT password_hash \
                 FROM user WHERE email = $email",
            )
            .bind(("email", email.clone()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or(DbError::NotFound {
            entity: "user".into(),
            id: email,
        })?;
        let role = self.resolve_role(&row.role_id).await?;
        Ok(row.try_into_user(role)?)
    }

    async fn get_credentials(&self, email: &str) -> StockgateResult<Credentials> {
        let email = normalize_email(email);
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, password_hash \
                 FROM user WHERE email = $email",
            )
            .bind(("email", email.clone()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CredentialsRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or(DbError::NotFound {
            entity: "user".into(),
            id: email,
        })?;
        let user_id = Uuid::parse_str(&row.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(Credentials {
            user_id,
            password_hash: row.password_hash,
        })
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> StockgateResult<User> {
        // Existence check up front so an unknown id fails NotFound
        // before any validation noise.
        self.fetch_row(id).await?;

        let email = input.email.as_deref().map(normalize_email);
        if let Some(ref email) = email {
            if email.is_empty() {
                return Err(StockgateError::validation("email must not be empty"));
            }
            if self.email_taken(email, Some(id)).await.map_err(DbError::from)? {
                return Err(StockgateError::duplicate("user", "email"));
            }
        }
        if let Some(role_id) = input.role_id {
            self.assert_role_exists(role_id).await?;
        }
        if let Some(ref custom) = input.custom_permissions {
            self.catalog.validate(custom)?;
        }
        if let Some(ref denied) = input.denied_permissions {
            self.catalog.validate(denied)?;
        }

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if email.is_some() {
            sets.push("email = $email");
        }
        if input.role_id.is_some() {
            sets.push("role_id = $role_id");
        }
        if input.custom_permissions.is_some() {
            sets.push("custom_permissions = $custom_permissions");
        }
        if input.denied_permissions.is_some() {
            sets.push("denied_permissions = $denied_permissions");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id.to_string()));
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(email) = email {
            builder = builder.bind(("email", email));
        }
        if let Some(role_id) = input.role_id {
            builder = builder.bind(("role_id", role_id.to_string()));
        }
        if let Some(custom) = input.custom_permissions {
            let custom: Vec<String> = custom.into_iter().collect();
            builder = builder.bind(("custom_permissions", custom));
        }
        if let Some(denied) = input.denied_permissions {
            let denied: Vec<String> = denied.into_iter().collect();
            builder = builder.bind(("denied_permissions", denied));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status_to_string(&status)));
        }

        builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| StockgateError::Persistence(e.to_string()))?;

        let row = self.fetch_row(id).await?;
        let role = self.resolve_role(&row.role_id).await?;
        Ok(row.into_user(id, role)?)
    }

    async fn soft_delete(&self, id: Uuid) -> StockgateResult<()> {
        self.fetch_row(id).await?;

        self.db
            .query(
                "UPDATE type::record('user', $id) SET \
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

    async fn list(&self, acting: &User) -> StockgateResult<Vec<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * OMIT password_hash \
                 FROM user WHERE is_active != false \
                 ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;
        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        let acting_id = acting.id.to_string();
        let acting_is_super = acting.is_super_admin();

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            // Never include the acting admin's own record.
            if row.record_id == acting_id {
                continue;
            }
            let role = self.resolve_role(&row.role_id).await?;
            // Non-super-admins cannot see (and so cannot target)
            // super or sub admins.
            if !acting_is_super
                && matches!(role.name(), Some(SUPER_ADMIN) | Some(SUB_ADMIN))
            {
                continue;
            }
            users.push(row.try_into_user(role)?);
        }

        Ok(users)
    }
}
