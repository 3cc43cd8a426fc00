//! Error taxonomy for the Stockgate RBAC core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StockgateError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Duplicate {entity}: {field} already in use")]
    Duplicate { entity: String, field: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Protected entity: {reason}")]
    ProtectedEntity { reason: String },

    #[error("Authorization denied: {reason}")]
    Authorization { reason: String },

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl StockgateError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn duplicate(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Duplicate {
            entity: entity.into(),
            field: field.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn protected(reason: impl Into<String>) -> Self {
        Self::ProtectedEntity {
            reason: reason.into(),
        }
    }
}

pub type StockgateResult<T> = Result<T, StockgateError>;
