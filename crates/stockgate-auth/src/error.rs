//! Authentication error types.

use stockgate_core::error::StockgateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is suspended")]
    AccountSuspended,

    #[error("account is deactivated")]
    AccountDeactivated,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for StockgateError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::AccountSuspended
            | AuthError::AccountDeactivated => StockgateError::Authorization {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => StockgateError::Persistence(format!("crypto: {msg}")),
        }
    }
}
