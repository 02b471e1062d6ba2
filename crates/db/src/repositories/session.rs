//! Session and refresh token repository.
//!
//! A session is the lineage of refresh tokens issued from one login. Tokens
//! are single use: rotating one consumes it and links it to its replacement.
//! Presenting a consumed token again revokes the whole session.

use chrono::{DateTime, Duration, Utc};
use million_shared::AppError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait, prelude::DateTimeWithTimeZone,
    sea_query::Expr,
};
use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

use super::user::UserRepository;
use crate::entities::{auth_sessions, refresh_tokens};

/// Revocation reason stored when a consumed refresh token is replayed.
pub const REUSE_REASON: &str = "refresh_token_reuse";

/// Errors from refresh token handling.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No token with that hash.
    #[error("Unknown refresh token")]
    UnknownToken,

    /// Token or session past its expiry.
    #[error("Refresh token expired")]
    Expired,

    /// Session already revoked.
    #[error("Session revoked")]
    Revoked,

    /// Token was already used; the session has been revoked.
    #[error("Refresh token reuse detected for session {session_id}")]
    Reused {
        /// The revoked session.
        session_id: Uuid,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Database(e) => Self::Database(e.to_string()),
            SessionError::UnknownToken => Self::Unauthorized("Invalid refresh token".into()),
            SessionError::Expired => Self::Unauthorized("Refresh token expired".into()),
            SessionError::Revoked => Self::Unauthorized("Session revoked".into()),
            SessionError::Reused { .. } => {
                Self::Unauthorized("Refresh token reuse detected".into())
            }
        }
    }
}

/// Client details recorded on a session.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    /// Remote address.
    pub ip_address: Option<String>,
    /// `User-Agent` header.
    pub user_agent: Option<String>,
}

/// A session together with the plaintext refresh token just issued for it.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// The session row.
    pub session: auth_sessions::Model,
    /// Plaintext refresh token. Never stored.
    pub refresh_token: String,
}

/// Session repository.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    db: DatabaseConnection,
}

impl SessionRepository {
    /// Creates a new session repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Hashes a refresh token for storage.
    #[must_use]
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Generates an opaque refresh token: 32 random bytes, base64url.
    #[must_use]
    pub fn generate_token() -> String {
        let bytes: [u8; 32] = rand::random();
        base64_url::encode(&bytes)
    }

    /// Opens a session and issues its first refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        user_id: Uuid,
        ttl: Duration,
        client: &ClientInfo,
    ) -> Result<IssuedSession, DbErr> {
        let now = Utc::now();
        let expires_at = now + ttl;
        let txn = self.db.begin().await?;

        let session = auth_sessions::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            created_at: Set(now.into()),
            last_used_at: Set(now.into()),
            expires_at: Set(expires_at.into()),
            ip_address: Set(client.ip_address.clone()),
            user_agent: Set(client.user_agent.clone()),
            revoked_at: Set(None),
            revoked_reason: Set(None),
        }
        .insert(&txn)
        .await?;

        let (_, refresh_token) =
            insert_refresh_token(&txn, session.id, user_id, now, expires_at).await?;

        txn.commit().await?;

        Ok(IssuedSession {
            session,
            refresh_token,
        })
    }

    /// Exchanges a refresh token for a new one under the same session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Reused` (after revoking the session) when the
    /// token was already consumed, and the other variants when the token is
    /// unknown, expired or its session revoked.
    pub async fn rotate(
        &self,
        refresh_token: &str,
        ttl: Duration,
        client: &ClientInfo,
    ) -> Result<IssuedSession, SessionError> {
        let now = Utc::now();
        let stamp: DateTimeWithTimeZone = now.into();
        let txn = self.db.begin().await?;

        let Some(token) = refresh_tokens::Entity::find()
            .filter(refresh_tokens::Column::TokenHash.eq(Self::hash_token(refresh_token)))
            .one(&txn)
            .await?
        else {
            return Err(SessionError::UnknownToken);
        };

        let Some(session) = auth_sessions::Entity::find_by_id(token.session_id)
            .one(&txn)
            .await?
        else {
            return Err(SessionError::UnknownToken);
        };

        if session.revoked_at.is_some() {
            return Err(SessionError::Revoked);
        }

        if token.consumed_at.is_some() {
            revoke_session(&txn, session.id, REUSE_REASON, now).await?;
            txn.commit().await?;
            warn!(session_id = %session.id, user_id = %session.user_id, "Refresh token reuse, session revoked");
            return Err(SessionError::Reused {
                session_id: session.id,
            });
        }

        if token.expires_at <= now || session.expires_at <= now {
            return Err(SessionError::Expired);
        }

        // Guarded update: a concurrent rotation of the same token loses here.
        let consumed = refresh_tokens::Entity::update_many()
            .col_expr(refresh_tokens::Column::ConsumedAt, Expr::value(stamp))
            .filter(refresh_tokens::Column::Id.eq(token.id))
            .filter(refresh_tokens::Column::ConsumedAt.is_null())
            .exec(&txn)
            .await?;

        if consumed.rows_affected == 0 {
            revoke_session(&txn, session.id, REUSE_REASON, now).await?;
            txn.commit().await?;
            warn!(session_id = %session.id, "Concurrent refresh token reuse, session revoked");
            return Err(SessionError::Reused {
                session_id: session.id,
            });
        }

        let (next_id, next_token) =
            insert_refresh_token(&txn, session.id, session.user_id, now, now + ttl).await?;

        refresh_tokens::ActiveModel {
            id: Set(token.id),
            replaced_by: Set(Some(next_id)),
            ..Default::default()
        }
        .update(&txn)
        .await?;

        let mut active: auth_sessions::ActiveModel = session.into();
        active.last_used_at = Set(stamp);
        active.expires_at = Set((now + ttl).into());
        if client.ip_address.is_some() {
            active.ip_address = Set(client.ip_address.clone());
        }
        if client.user_agent.is_some() {
            active.user_agent = Set(client.user_agent.clone());
        }
        let session = active.update(&txn).await?;

        txn.commit().await?;

        Ok(IssuedSession {
            session,
            refresh_token: next_token,
        })
    }

    /// Finds a session by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<auth_sessions::Model>, DbErr> {
        auth_sessions::Entity::find_by_id(id).one(&self.db).await
    }

    /// Returns true if the session belongs to the user and is not revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn is_active(&self, session_id: Uuid, user_id: Uuid) -> Result<bool, DbErr> {
        Ok(self
            .find_by_id(session_id)
            .await?
            .is_some_and(|s| s.user_id == user_id && s.revoked_at.is_none()))
    }

    /// Active (unrevoked, unexpired) sessions of a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_active(&self, user_id: Uuid) -> Result<Vec<auth_sessions::Model>, DbErr> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        auth_sessions::Entity::find()
            .filter(auth_sessions::Column::UserId.eq(user_id))
            .filter(auth_sessions::Column::RevokedAt.is_null())
            .filter(auth_sessions::Column::ExpiresAt.gt(now))
            .order_by_desc(auth_sessions::Column::CreatedAt)
            .order_by_desc(auth_sessions::Column::Id)
            .all(&self.db)
            .await
    }

    /// Revokes one session owned by `user_id`.
    ///
    /// Returns false when the session does not exist, belongs to someone
    /// else or is already revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn revoke(&self, user_id: Uuid, session_id: Uuid, reason: &str) -> Result<bool, DbErr> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let result = auth_sessions::Entity::update_many()
            .col_expr(auth_sessions::Column::RevokedAt, Expr::value(now))
            .col_expr(auth_sessions::Column::RevokedReason, Expr::value(reason))
            .filter(auth_sessions::Column::Id.eq(session_id))
            .filter(auth_sessions::Column::UserId.eq(user_id))
            .filter(auth_sessions::Column::RevokedAt.is_null())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Global logout: bumps the auth cutoff to `now` and revokes every open
    /// session, in one transaction. Returns the number of sessions revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn logout_all(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<u64, DbErr> {
        let txn = self.db.begin().await?;
        UserRepository::bump_auth_valid_after(&txn, user_id, now).await?;
        let revoked = revoke_all_sessions(&txn, user_id, "logout_all", now).await?;
        txn.commit().await?;
        Ok(revoked)
    }

    /// Stores a new password hash, bumps the auth cutoff and revokes every
    /// session, in one transaction. Returns the number of sessions revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        let txn = self.db.begin().await?;
        UserRepository::set_password_hash(&txn, user_id, password_hash).await?;
        UserRepository::bump_auth_valid_after(&txn, user_id, now).await?;
        let revoked = revoke_all_sessions(&txn, user_id, "password_changed", now).await?;
        txn.commit().await?;
        Ok(revoked)
    }
}

async fn insert_refresh_token<C: ConnectionTrait>(
    conn: &C,
    session_id: Uuid,
    user_id: Uuid,
    now: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Result<(Uuid, String), DbErr> {
    let token = SessionRepository::generate_token();
    let row = refresh_tokens::ActiveModel {
        id: Set(Uuid::now_v7()),
        session_id: Set(session_id),
        user_id: Set(user_id),
        token_hash: Set(SessionRepository::hash_token(&token)),
        created_at: Set(now.into()),
        expires_at: Set(expires_at.into()),
        consumed_at: Set(None),
        replaced_by: Set(None),
    }
    .insert(conn)
    .await?;

    Ok((row.id, token))
}

async fn revoke_session<C: ConnectionTrait>(
    conn: &C,
    session_id: Uuid,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    let stamp: DateTimeWithTimeZone = now.into();
    auth_sessions::Entity::update_many()
        .col_expr(auth_sessions::Column::RevokedAt, Expr::value(stamp))
        .col_expr(auth_sessions::Column::RevokedReason, Expr::value(reason))
        .filter(auth_sessions::Column::Id.eq(session_id))
        .filter(auth_sessions::Column::RevokedAt.is_null())
        .exec(conn)
        .await?;
    Ok(())
}

async fn revoke_all_sessions<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<u64, DbErr> {
    let stamp: DateTimeWithTimeZone = now.into();
    let result = auth_sessions::Entity::update_many()
        .col_expr(auth_sessions::Column::RevokedAt, Expr::value(stamp))
        .col_expr(auth_sessions::Column::RevokedReason, Expr::value(reason))
        .filter(auth_sessions::Column::UserId.eq(user_id))
        .filter(auth_sessions::Column::RevokedAt.is_null())
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
