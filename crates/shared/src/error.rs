//! Persistence error type shared by every store implementation

use thiserror::Error;

/// PostgreSQL `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No row matched the lookup
    #[error("Record not found")]
    NotFound,

    /// A unique constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) => {
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                    return StoreError::Conflict(
                        db_err
                            .constraint()
                            .unwrap_or("unique constraint")
                            .to_string(),
                    );
                }
                StoreError::Database(db_err.to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
