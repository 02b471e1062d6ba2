//! Auth event repository: the audit trail behind login throttling and
//! `GET /auth/events`.

use chrono::{DateTime, Utc};
use million_core::auth::AuthEventKind;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, prelude::DateTimeWithTimeZone,
};
use uuid::Uuid;

use crate::entities::auth_events;

/// One auth event to record.
#[derive(Debug, Clone)]
pub struct NewAuthEvent {
    /// Event kind.
    pub kind: AuthEventKind,
    /// Whether the attempt succeeded.
    pub success: bool,
    /// User, if known.
    pub user_id: Option<Uuid>,
    /// Username as submitted.
    pub username: Option<String>,
    /// Session involved.
    pub session_id: Option<Uuid>,
    /// Remote address.
    pub ip_address: Option<String>,
    /// `User-Agent` header.
    pub user_agent: Option<String>,
    /// Free-form detail, e.g. a failure reason.
    pub detail: Option<String>,
}

impl NewAuthEvent {
    /// Starts an event of the given kind and outcome.
    #[must_use]
    pub const fn new(kind: AuthEventKind, success: bool) -> Self {
        Self {
            kind,
            success,
            user_id: None,
            username: None,
            session_id: None,
            ip_address: None,
            user_agent: None,
            detail: None,
        }
    }
}

/// Auth event repository.
#[derive(Debug, Clone)]
pub struct AuthEventRepository {
    db: DatabaseConnection,
}

impl AuthEventRepository {
    /// Creates a new auth event repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends an event.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn record(&self, event: NewAuthEvent) -> Result<auth_events::Model, DbErr> {
        auth_events::ActiveModel {
            id: Set(Uuid::now_v7()),
            created_at: Set(Utc::now().into()),
            event_type: Set(event.kind.as_str().to_string()),
            success: Set(event.success),
            user_id: Set(event.user_id),
            username: Set(event.username),
            session_id: Set(event.session_id),
            ip_address: Set(event.ip_address),
            user_agent: Set(event.user_agent),
            detail: Set(event.detail),
        }
        .insert(&self.db)
        .await
    }

    /// Counts failed logins for a username+ip pair since `since`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_recent_failures(
        &self,
        username: &str,
        ip_address: Option<&str>,
        since: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        let since: DateTimeWithTimeZone = since.into();
        let mut query = auth_events::Entity::find()
            .filter(auth_events::Column::EventType.eq(AuthEventKind::Login.as_str()))
            .filter(auth_events::Column::Success.eq(false))
            .filter(auth_events::Column::Username.eq(username))
            .filter(auth_events::Column::CreatedAt.gte(since));

        query = match ip_address {
            Some(ip) => query.filter(auth_events::Column::IpAddress.eq(ip)),
            None => query.filter(auth_events::Column::IpAddress.is_null()),
        };

        query.count(&self.db).await
    }

    /// Most recent events for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> Result<Vec<auth_events::Model>, DbErr> {
        auth_events::Entity::find()
            .filter(auth_events::Column::UserId.eq(user_id))
            .order_by_desc(auth_events::Column::CreatedAt)
            .order_by_desc(auth_events::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
    }
}
