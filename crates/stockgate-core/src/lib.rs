//! Stockgate Core — permission catalog, domain models, authorization
//! engine, hierarchy guard and audit trail for the inventory backend.
//!
//! Transport (HTTP routing, request parsing) and storage wiring live
//! in the collaborating crates; this crate defines the repository
//! traits they implement and the pure decision logic they call into.

pub mod audit;
pub mod authz;
pub mod catalog;
pub mod error;
pub mod hierarchy;
pub mod models;
pub mod repository;

pub use audit::AuditTrail;
pub use authz::{AuthzEngine, AuthzPolicy, Decision};
pub use catalog::{PermissionCatalog, SUB_ADMIN, SUPER_ADMIN, WILDCARD};
pub use error::{StockgateError, StockgateResult};
pub use hierarchy::{RequestedChange, can_modify};
