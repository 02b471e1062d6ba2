//! Budget entry repository.

use chrono::{NaiveDate, Utc};
use million_core::budget::BudgetKind;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::budget_entries;

/// Input for a budget line.
#[derive(Debug, Clone)]
pub struct NewBudgetEntry {
    /// Owner.
    pub user_id: Uuid,
    /// Category label.
    pub category: String,
    /// Expense, income or asset.
    pub kind: BudgetKind,
    /// Amount.
    pub amount: Decimal,
    /// Date the line applies to.
    pub entry_date: NaiveDate,
    /// Optional description.
    pub description: Option<String>,
}

/// Budget repository.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a budget line.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: NewBudgetEntry) -> Result<budget_entries::Model, DbErr> {
        budget_entries::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(input.user_id),
            category: Set(input.category),
            kind: Set(input.kind.into()),
            amount: Set(input.amount),
            entry_date: Set(input.entry_date),
            description: Set(input.description),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
    }

    /// Lists the user's budget lines, most recent date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<budget_entries::Model>, DbErr> {
        budget_entries::Entity::find()
            .filter(budget_entries::Column::UserId.eq(user_id))
            .order_by_desc(budget_entries::Column::EntryDate)
            .order_by_desc(budget_entries::Column::CreatedAt)
            .all(&self.db)
            .await
    }
}
