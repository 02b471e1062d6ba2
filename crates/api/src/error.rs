//! Error responses.
//!
//! Handlers return [`ApiResult`] and use `?` on repository and domain calls;
//! every error is rendered as `{"error": "<CODE>", "message": "<text>"}` with
//! the status from [`AppError::status_code`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use million_core::{auth::PasswordError, ledger::LedgerError, trading::TradingError};
use million_db::repositories::{JournalError, SessionError};
use million_shared::{AppError, JwtError};
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Wrapper that turns an [`AppError`] into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// Returns the wrapped error.
    #[must_use]
    pub const fn inner(&self) -> &AppError {
        &self.0
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if err.is_server_error() {
            error!(error = %err, "Request failed");
            "An internal error occurred".to_string()
        } else {
            client_message(&err)
        };

        (
            status,
            Json(json!({
                "error": err.error_code(),
                "message": message,
            })),
        )
            .into_response()
    }
}

fn client_message(err: &AppError) -> String {
    match err {
        AppError::Unauthorized(msg)
        | AppError::Forbidden(msg)
        | AppError::NotFound(msg)
        | AppError::Validation(msg)
        | AppError::BusinessRule(msg)
        | AppError::Conflict(msg)
        | AppError::RateLimited(msg)
        | AppError::Database(msg)
        | AppError::Internal(msg) => msg.clone(),
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        Self(err.into())
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(err.into())
    }
}

impl From<TradingError> for ApiError {
    fn from(err: TradingError) -> Self {
        Self(err.into())
    }
}

impl From<JournalError> for ApiError {
    fn from(err: JournalError) -> Self {
        Self(err.into())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self(err.into())
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Weak(msg) => Self(AppError::Validation(msg.to_string())),
            other => Self(AppError::Internal(other.to_string())),
        }
    }
}
