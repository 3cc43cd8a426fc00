//! Password authentication for Stockgate.

pub mod error;
pub mod password;
pub mod service;

pub use error::AuthError;
pub use password::{hash_password, verify_password};
pub use service::AuthService;
