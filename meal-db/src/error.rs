//! Meal database error types

use meal_core::MealError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MealDbError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A ledger rule rejected the operation inside its transaction
    #[error(transparent)]
    Rejected(#[from] MealError),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Blocking task failed: {0}")]
    Join(String),
}

pub type MealDbResult<T> = Result<T, MealDbError>;

impl From<MealDbError> for MealError {
    fn from(err: MealDbError) -> Self {
        match err {
            MealDbError::Rejected(e) => e,
            other => MealError::storage(other.to_string()),
        }
    }
}

/// Whether a statement failed on a UNIQUE constraint
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
