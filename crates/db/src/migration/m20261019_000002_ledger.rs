//! Double-entry ledger: accounts, entries and lines.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

use crate::entities::{ledger_accounts, ledger_entries, ledger_lines};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        manager
            .create_table(schema.create_table_from_entity(ledger_accounts::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(ledger_entries::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(ledger_lines::Entity))
            .await?;

        // One account per (user, name, currency)
        manager
            .create_index(
                Index::create()
                    .name("uq_ledger_accounts_user_name_currency")
                    .table(ledger_accounts::Entity)
                    .col(ledger_accounts::Column::UserId)
                    .col(ledger_accounts::Column::Name)
                    .col(ledger_accounts::Column::Currency)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // NULL keys never collide
        manager
            .create_index(
                Index::create()
                    .name("uq_ledger_entries_user_idempotency")
                    .table(ledger_entries::Entity)
                    .col(ledger_entries::Column::UserId)
                    .col(ledger_entries::Column::IdempotencyKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_entries_user_effective")
                    .table(ledger_entries::Entity)
                    .col(ledger_entries::Column::UserId)
                    .col(ledger_entries::Column::EffectiveAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_lines_account")
                    .table(ledger_lines::Entity)
                    .col(ledger_lines::Column::AccountId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_lines_entry")
                    .table(ledger_lines::Entity)
                    .col(ledger_lines::Column::EntryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ledger_lines::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ledger_entries::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ledger_accounts::Entity).to_owned())
            .await?;
        Ok(())
    }
}
