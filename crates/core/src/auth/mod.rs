//! Authentication rules.
//!
//! This module provides:
//! - Password hashing with Argon2id and the strength policy
//! - Username normalisation
//! - The login throttle rule
//! - Auth event kinds recorded for the audit trail

mod password;
mod throttle;

pub use password::{
    MIN_PASSWORD_LEN, PasswordError, hash_password, validate_password_policy, verify_password,
};
pub use throttle::LoginThrottle;

use serde::{Deserialize, Serialize};

/// Longest accepted username.
pub const MAX_USERNAME_LEN: usize = 64;

/// Trims a username and checks it is usable.
///
/// # Errors
///
/// Returns a message if the username is blank or too long.
pub fn normalize_username(raw: &str) -> Result<String, &'static str> {
    let username = raw.trim();
    if username.is_empty() {
        return Err("Username is required");
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err("Username is too long");
    }
    Ok(username.to_string())
}

/// Kind of auth event in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthEventKind {
    /// Account created.
    Signup,
    /// Login attempt.
    Login,
    /// Refresh token exchange.
    Refresh,
    /// Current session logged out.
    Logout,
    /// All sessions logged out.
    LogoutAll,
    /// One session revoked by id.
    RevokeSession,
    /// Password changed.
    ChangePassword,
}

impl AuthEventKind {
    /// Returns the stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::Login => "login",
            Self::Refresh => "refresh",
            Self::Logout => "logout",
            Self::LogoutAll => "logout_all",
            Self::RevokeSession => "revoke_session",
            Self::ChangePassword => "change_password",
        }
    }
}

impl std::fmt::Display for AuthEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
