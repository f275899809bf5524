//! Custom error types for the common library
//!
//! This module defines application-specific error types that can be used
//! throughout the application.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Classify an error returned by a query.
    ///
    /// Unique violations are split out so callers can report them as a
    /// conflict instead of a generic failure.
    pub fn from_query(error: SqlxError) -> Self {
        if let SqlxError::Database(db_error) = &error {
            if db_error.is_unique_violation() {
                let constraint = db_error
                    .constraint()
                    .map(str::to_string)
                    .unwrap_or_else(|| db_error.message().to_string());
                return DatabaseError::UniqueViolation(constraint);
            }
        }

        DatabaseError::Query(error)
    }

    /// Whether this error came from a unique constraint
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DatabaseError::UniqueViolation(_))
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
