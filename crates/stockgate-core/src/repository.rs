//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations delegate to
//! the persistence layer; correctness of soft-delete and permission
//! updates relies on its atomic single-document update guarantee.
//! Concurrent edits to the same entity are last-writer-wins.

use uuid::Uuid;

use crate::error::StockgateResult;
use crate::models::{
    audit::{AuditLogEntry, CreateAuditLogEntry},
    product::{CreateProduct, Product, UpdateProduct},
    role::{CreateRole, Role, UpdateRole},
    user::{CreateUser, Credentials, UpdateUser, User},
};

pub trait RoleRepository: Send + Sync {
    /// Create a role. Fails `Duplicate` on a name collision and
    /// `Validation` on a permission token outside the catalog.
    fn create(&self, input: CreateRole) -> impl Future<Output = StockgateResult<Role>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = StockgateResult<Role>> + Send;
    fn get_by_name(&self, name: &str) -> impl Future<Output = StockgateResult<Role>> + Send;
    /// Merge the provided fields. A provided permission set fully
    /// replaces the stored one.
    fn update(
        &self,
        id: Uuid,
        input: UpdateRole,
    ) -> impl Future<Output = StockgateResult<Role>> + Send;
    /// Soft-delete: sets `is_active = false` and `deleted_at = now` in
    /// a single atomic update. Fails `ProtectedEntity` for the
    /// `super_admin` role.
    fn soft_delete(&self, id: Uuid) -> impl Future<Output = StockgateResult<()>> + Send;
    /// Active roles only. A record without the `is_active` flag counts
    /// as active.
    fn list(&self) -> impl Future<Output = StockgateResult<Vec<Role>>> + Send;
}

pub trait UserRepository: Send + Sync {
    /// Create a user. The password is hashed before persistence.
    fn create(&self, input: CreateUser) -> impl Future<Output = StockgateResult<User>> + Send;
    /// Fetch a user with their role resolved. The credential field is
    /// never part of this read.
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = StockgateResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = StockgateResult<User>> + Send;
    /// Explicit credential fetch for the authentication collaborator.
    fn get_credentials(
        &self,
        email: &str,
    ) -> impl Future<Output = StockgateResult<Credentials>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = StockgateResult<User>> + Send;
    fn soft_delete(&self, id: Uuid) -> impl Future<Output = StockgateResult<()>> + Send;
    /// Hierarchy-aware listing: excludes the acting admin's own record
    /// and, unless the acting admin is a super admin, every user whose
    /// role is `super_admin` or `sub_admin`.
    fn list(&self, acting: &User) -> impl Future<Output = StockgateResult<Vec<User>>> + Send;
}

pub trait ProductRepository: Send + Sync {
    fn create(
        &self,
        input: CreateProduct,
        actor: Uuid,
    ) -> impl Future<Output = StockgateResult<Product>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = StockgateResult<Product>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateProduct,
        actor: Uuid,
    ) -> impl Future<Output = StockgateResult<Product>> + Send;
    fn soft_delete(&self, id: Uuid) -> impl Future<Output = StockgateResult<()>> + Send;
    /// Active products, newest first.
    fn list(&self) -> impl Future<Output = StockgateResult<Vec<Product>>> + Send;
}

/// Query filters for audit history. Both filters are optional and
/// independently combinable; both `None` means the full history.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
}

pub trait AuditLogRepository: Send + Sync {
    /// Append a new entry. No update or delete operations exist.
    fn append(
        &self,
        input: CreateAuditLogEntry,
    ) -> impl Future<Output = StockgateResult<AuditLogEntry>> + Send;
    /// Matching entries sorted by `created_at` descending, capped at
    /// [`crate::audit::QUERY_LIMIT`].
    fn query(
        &self,
        filter: AuditQuery,
    ) -> impl Future<Output = StockgateResult<Vec<AuditLogEntry>>> + Send;
}
