//! Custom error types for the accounts service

use common::error::DatabaseError;
use thiserror::Error;
use uuid::Uuid;

use crate::validation::ValidationErrors;

/// Custom error type for account operations
#[derive(Error, Debug)]
pub enum AccountError {
    /// One or more fields failed validation
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The store rejected a write that passed validation, e.g. two sign-ups
    /// racing for the same email. Re-validating reports the conflict.
    #[error("Storage conflict: {0}")]
    StorageConflict(String),

    /// No user with this id
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// No micropost with this id
    #[error("Micropost not found: {0}")]
    MicropostNotFound(Uuid),

    /// Password hashing failed
    #[error("Password hashing error: {0}")]
    Hashing(String),

    /// Any other storage failure
    #[error("Database error: {0}")]
    Database(#[source] DatabaseError),
}

impl AccountError {
    /// Validation errors carried by this error, if any
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            AccountError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for AccountError {
    fn from(errors: ValidationErrors) -> Self {
        AccountError::Validation(errors)
    }
}

impl From<DatabaseError> for AccountError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::UniqueViolation(constraint) => AccountError::StorageConflict(constraint),
            other => AccountError::Database(other),
        }
    }
}

/// Type alias for Result with AccountError
pub type AccountResult<T> = Result<T, AccountError>;
