//! SurrealDB implementations of the `stockgate-core` repository traits.

mod audit;
mod product;
mod role;
mod user;

pub use audit::SurrealAuditLogRepository;
pub use product::SurrealProductRepository;
pub use role::SurrealRoleRepository;
pub use user::SurrealUserRepository;
