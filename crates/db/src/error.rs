//! Errors returned by the repositories.

use bursar_core::LedgerError;
use bursar_shared::AppError;
use sea_orm::{DbErr, SqlErr};

/// Error type for every posting and reporting operation.
#[derive(Debug, thiserror::Error)]
pub enum PostingError {
    /// A ledger rule rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl PostingError {
    /// Returns the ledger error, if this is one.
    #[must_use]
    pub const fn ledger(&self) -> Option<&LedgerError> {
        match self {
            Self::Ledger(err) => Some(err),
            Self::Database(_) => None,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(err) => err.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.ledger().is_some_and(LedgerError::is_retryable)
    }

    /// Maps a unique-key violation to a lost race on `entity`.
    ///
    /// Used where a unique key is claimed by concurrent writers, such as
    /// journal references or stock movement sequence numbers.
    pub(crate) fn from_claim(err: DbErr, entity: &'static str, key: impl Into<String>) -> Self {
        if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            LedgerError::ConcurrentModification {
                entity,
                key: key.into(),
            }
            .into()
        } else {
            err.into()
        }
    }
}

impl From<PostingError> for AppError {
    fn from(err: PostingError) -> Self {
        match err {
            PostingError::Ledger(err) => err.into(),
            PostingError::Database(err) => Self::Database(err.to_string()),
        }
    }
}
