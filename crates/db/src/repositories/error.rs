//! Errors shared by the journal repositories (trades, orders, accounts,
//! budget).

use million_core::trading::TradingError;
use million_shared::AppError;
use sea_orm::DbErr;
use uuid::Uuid;

/// Error types for journal operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// Row missing or owned by another user.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Resource name.
        kind: &'static str,
        /// Requested ID.
        id: Uuid,
    },

    /// Duplicate of an existing row.
    #[error("{0}")]
    Conflict(String),

    /// Invalid input.
    #[error("{0}")]
    Validation(String),

    /// Trading rule violation.
    #[error(transparent)]
    Trading(#[from] TradingError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl JournalError {
    /// Shorthand for a missing row.
    #[must_use]
    pub const fn not_found(kind: &'static str, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }
}

impl From<JournalError> for AppError {
    fn from(err: JournalError) -> Self {
        match err {
            JournalError::NotFound { .. } => Self::NotFound(err.to_string()),
            JournalError::Conflict(msg) => Self::Conflict(msg),
            JournalError::Validation(msg) => Self::Validation(msg),
            JournalError::Trading(e) => e.into(),
            JournalError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_app_error() {
        let err: AppError = JournalError::not_found("Trade", Uuid::nil()).into();
        assert_eq!(err.status_code(), 404);
        assert!(err.to_string().contains("Trade not found"));

        let err: AppError = JournalError::Trading(TradingError::AlreadyClosed).into();
        assert_eq!(err.status_code(), 409);

        let err: AppError = JournalError::Validation("bad".into()).into();
        assert_eq!(err.status_code(), 400);
    }
}
