//! Trading journal, brokerage accounts, holdings and budget lines.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

use crate::entities::{accounts, budget_entries, holdings, order_events, orders, trades};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        manager
            .create_table(schema.create_table_from_entity(trades::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(orders::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(order_events::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(accounts::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(holdings::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(budget_entries::Entity))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_trades_user_client_order")
                    .table(trades::Entity)
                    .col(trades::Column::UserId)
                    .col(trades::Column::ClientOrderId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_orders_user_client_order")
                    .table(orders::Entity)
                    .col(orders::Column::UserId)
                    .col(orders::Column::ClientOrderId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_accounts_user_name")
                    .table(accounts::Entity)
                    .col(accounts::Column::UserId)
                    .col(accounts::Column::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_holdings_account_symbol")
                    .table(holdings::Entity)
                    .col(holdings::Column::AccountId)
                    .col(holdings::Column::Symbol)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_events_order")
                    .table(order_events::Entity)
                    .col(order_events::Column::OrderId)
                    .col(order_events::Column::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_budget_entries_user_date")
                    .table(budget_entries::Entity)
                    .col(budget_entries::Column::UserId)
                    .col(budget_entries::Column::EntryDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(budget_entries::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(holdings::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(accounts::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(order_events::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(orders::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(trades::Entity).to_owned())
            .await?;
        Ok(())
    }
}
