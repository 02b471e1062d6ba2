//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use crate::{AppState, error::ApiError};
use million_db::repositories::{SessionRepository, UserRepository};
use million_shared::{AppError, Claims};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates access tokens.
///
/// A token is accepted only when:
/// 1. its signature and expiry check out
/// 2. its user still exists
/// 3. it was issued at or after the user's `auth_valid_after`
/// 4. its session is still open
///
/// The claims are then stored in request extensions for handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return Err(AppError::Unauthorized(
            "Authorization header with Bearer token is required".into(),
        )
        .into());
    };

    let claims = state.jwt_service.validate_token(token)?;

    let user = UserRepository::new((*state.db).clone())
        .find_by_id(claims.user_id())
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".into()))?;

    if !claims.issued_at_or_after(user.auth_valid_after.with_timezone(&Utc)) {
        debug!(user_id = %user.id, "Token issued before auth cutoff");
        return Err(AppError::Unauthorized("Token has been revoked".into()).into());
    }

    let active = SessionRepository::new((*state.db).clone())
        .is_active(claims.session_id(), user.id)
        .await?;
    if !active {
        debug!(session_id = %claims.session_id(), "Token for closed session");
        return Err(AppError::Unauthorized("Session revoked".into()).into());
    }

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Extractor for authenticated user claims.
///
/// Only valid behind [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub const fn user_id(&self) -> uuid::Uuid {
        self.0.user_id()
    }

    /// Returns the session the token belongs to.
    #[must_use]
    pub const fn session_id(&self) -> uuid::Uuid {
        self.0.session_id()
    }

    /// Returns the username carried in the token.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.0.username
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".into()).into())
    }
}
