//! Users, sessions, refresh tokens and the auth audit trail.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

use crate::entities::{auth_events, auth_sessions, refresh_tokens, users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        manager
            .create_table(schema.create_table_from_entity(users::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(auth_sessions::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(refresh_tokens::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(auth_events::Entity))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_auth_sessions_user")
                    .table(auth_sessions::Entity)
                    .col(auth_sessions::Column::UserId)
                    .col(auth_sessions::Column::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_refresh_tokens_session")
                    .table(refresh_tokens::Entity)
                    .col(refresh_tokens::Column::SessionId)
                    .to_owned(),
            )
            .await?;

        // Login throttle lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_auth_events_username_ip")
                    .table(auth_events::Entity)
                    .col(auth_events::Column::Username)
                    .col(auth_events::Column::IpAddress)
                    .col(auth_events::Column::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_auth_events_user")
                    .table(auth_events::Entity)
                    .col(auth_events::Column::UserId)
                    .col(auth_events::Column::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(auth_events::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(refresh_tokens::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(auth_sessions::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(users::Entity).to_owned())
            .await?;
        Ok(())
    }
}
