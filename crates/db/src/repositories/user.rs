//! User repository for database operations.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::users;

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a new user. The auth cutoff starts at the Unix epoch.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including a unique violation on
    /// the username.
    pub async fn create(&self, username: &str, password_hash: &str) -> Result<users::Model, DbErr> {
        users::ActiveModel {
            id: Set(Uuid::now_v7()),
            username: Set(username.to_string()),
            password_hash: Set(password_hash.to_string()),
            auth_valid_after: Set(DateTime::<Utc>::UNIX_EPOCH.into()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
    }

    /// Moves the auth cutoff forward so every older access token is rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn bump_auth_valid_after<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        users::ActiveModel {
            id: Set(user_id),
            auth_valid_after: Set(cutoff.into()),
            ..Default::default()
        }
        .update(conn)
        .await?;
        Ok(())
    }

    /// Stores a new password hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn set_password_hash<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), DbErr> {
        users::ActiveModel {
            id: Set(user_id),
            password_hash: Set(password_hash.to_string()),
            ..Default::default()
        }
        .update(conn)
        .await?;
        Ok(())
    }
}
