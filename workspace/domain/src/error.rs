use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use tracing::error;

/// Error types for the marketplace business rules
#[derive(Error, Debug)]
pub enum DomainError {
    /// Malformed or missing input that got past request validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Missing or invalid credential
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to touch this resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A business rule guard refused the operation
    #[error("{0}")]
    PreconditionFailed(String),

    /// Uniqueness violation
    #[error("{0}")]
    Conflict(String),

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(DbErr),
}

impl DomainError {
    pub fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        DomainError::NotFound(format!("{} {} not found", what, id))
    }
}

impl From<DbErr> for DomainError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                DomainError::Conflict(format!("Duplicate entry: {}", detail))
            }
            _ => {
                error!(error = %err, "Store operation failed");
                DomainError::Database(err)
            }
        }
    }
}

/// Type alias for Result with DomainError
pub type Result<T> = std::result::Result<T, DomainError>;
