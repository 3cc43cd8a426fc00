//! Database-specific error types and conversions.

use stockgate_core::error::StockgateError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Duplicate {entity}: {field} already in use")]
    Duplicate { entity: String, field: String },
}

impl From<DbError> for StockgateError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => StockgateError::NotFound { entity, id },
            DbError::Duplicate { entity, field } => StockgateError::Duplicate { entity, field },
            other => StockgateError::Persistence(other.to_string()),
        }
    }
}
