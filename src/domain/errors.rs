//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::auth::PasswordError;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Resource not found
    #[error("Resource not found")]
    NotFound,
    /// Input rejected before reaching the database
    #[error("Validation error: {0}")]
    Validation(String),
    /// A unique value is already taken
    #[error("Conflict: {0}")]
    Conflict(String),
    /// The database refused a write (unique or foreign key constraint)
    #[error("Constraint violation: {0}")]
    Constraint(String),
    /// Database/persistence error
    #[error("Database error: {0}")]
    Database(String),
    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DbErr> for DomainError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg))
            | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => DomainError::Constraint(msg),
            _ => DomainError::Database(e.to_string()),
        }
    }
}

impl From<PasswordError> for DomainError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::Empty => DomainError::Validation(e.to_string()),
            _ => DomainError::Internal(e.to_string()),
        }
    }
}
