//! Authentication types for JWT and tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Session the token was issued under.
    pub sid: Uuid,
    /// Username at issue time.
    pub username: String,
    /// Issued at timestamp (seconds).
    pub iat: i64,
    /// Issued at timestamp (microseconds), compared against `auth_valid_after`.
    pub iat_us: i64,
    /// Expiration timestamp.
    pub exp: i64,
    /// Unique token ID.
    pub jti: Uuid,
}

impl Claims {
    /// Creates new claims for a user session.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        session_id: Uuid,
        username: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: user_id,
            sid: session_id,
            username: username.to_string(),
            iat: issued_at.timestamp(),
            iat_us: issued_at.timestamp_micros(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the session ID from claims.
    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.sid
    }

    /// Returns true if the token was issued at or after `cutoff`.
    #[must_use]
    pub fn issued_at_or_after(&self, cutoff: DateTime<Utc>) -> bool {
        self.iat_us >= cutoff.timestamp_micros()
    }
}

/// Signup request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    /// Desired username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// User password.
    pub password: String,
}

/// Refresh token request.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token.
    pub refresh_token: String,
}

/// Change password request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    /// Current password.
    pub current_password: String,
    /// New password.
    pub new_password: String,
}

/// Token pair returned by signup, login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Access token (short-lived).
    pub access_token: String,
    /// Refresh token (long-lived, single use).
    pub refresh_token: String,
    /// Always `bearer`.
    pub token_type: String,
    /// Access token expiration in seconds.
    pub expires_in: i64,
    /// Authenticated user.
    pub user_id: Uuid,
    /// Authenticated username.
    pub username: String,
}

/// Response for `GET /auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    /// User ID.
    pub user_id: Uuid,
    /// Username.
    pub username: String,
}
