//! Brokerage account and holdings repository.
//!
//! Holdings are keyed by (account, symbol). Trades keep the default
//! `"Trading"` account in sync through [`adjust_holding`].

use chrono::Utc;
use million_core::trading::{Position, apply_delta};
use million_shared::types::CurrencyCode;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, prelude::DateTimeWithTimeZone,
};
use tracing::debug;
use uuid::Uuid;

use super::error::JournalError;
use crate::entities::{accounts, holdings};

/// Account that trades are booked against.
pub const DEFAULT_TRADING_ACCOUNT: &str = "Trading";

/// Input for creating a brokerage account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Owner.
    pub user_id: Uuid,
    /// Display name, unique per user.
    pub name: String,
    /// Broker name.
    pub broker: Option<String>,
    /// Account currency.
    pub currency: CurrencyCode,
}

/// Input for setting a holding.
#[derive(Debug, Clone)]
pub struct UpsertHoldingInput {
    /// Upper-cased symbol.
    pub symbol: String,
    /// Signed quantity.
    pub quantity: Decimal,
    /// Average cost.
    pub avg_cost: Option<Decimal>,
}

/// Brokerage account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::Conflict` if the user already has an account
    /// with that name.
    pub async fn create(&self, input: CreateAccountInput) -> Result<accounts::Model, JournalError> {
        if find_by_name(&self.db, input.user_id, &input.name)
            .await?
            .is_some()
        {
            return Err(JournalError::Conflict(format!(
                "Account '{}' already exists",
                input.name
            )));
        }

        Ok(accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(input.user_id),
            name: Set(input.name),
            broker: Set(input.broker),
            currency: Set(input.currency.as_str().to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?)
    }

    /// Lists the user's accounts by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<accounts::Model>, DbErr> {
        accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id))
            .order_by_asc(accounts::Column::Name)
            .all(&self.db)
            .await
    }

    /// Lists holdings of one of the user's accounts.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::NotFound` if the account is not the user's.
    pub async fn holdings(
        &self,
        user_id: Uuid,
        account_id: Uuid,
    ) -> Result<Vec<holdings::Model>, JournalError> {
        let account = self.owned(user_id, account_id).await?;
        Ok(account
            .find_related(holdings::Entity)
            .order_by_asc(holdings::Column::Symbol)
            .all(&self.db)
            .await?)
    }

    /// Sets a holding's quantity and cost, inserting it if missing.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::NotFound` if the account is not the user's.
    pub async fn upsert_holding(
        &self,
        user_id: Uuid,
        account_id: Uuid,
        input: UpsertHoldingInput,
    ) -> Result<holdings::Model, JournalError> {
        self.owned(user_id, account_id).await?;

        let existing = find_holding(&self.db, account_id, &input.symbol).await?;
        let now: DateTimeWithTimeZone = Utc::now().into();

        let model = match existing {
            Some(row) => {
                let mut active: holdings::ActiveModel = row.into();
                active.quantity = Set(input.quantity);
                active.avg_cost = Set(input.avg_cost);
                active.updated_at = Set(now);
                active.update(&self.db).await?
            }
            None => {
                holdings::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    user_id: Set(user_id),
                    account_id: Set(account_id),
                    symbol: Set(input.symbol),
                    quantity: Set(input.quantity),
                    avg_cost: Set(input.avg_cost),
                    updated_at: Set(now),
                }
                .insert(&self.db)
                .await?
            }
        };

        Ok(model)
    }

    async fn owned(&self, user_id: Uuid, account_id: Uuid) -> Result<accounts::Model, JournalError> {
        accounts::Entity::find_by_id(account_id)
            .filter(accounts::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| JournalError::not_found("Account", account_id))
    }
}

/// Finds or creates the user's default trading account.
///
/// # Errors
///
/// Returns an error if the database query or insert fails.
pub async fn ensure_default_account<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<accounts::Model, DbErr> {
    if let Some(account) = find_by_name(conn, user_id, DEFAULT_TRADING_ACCOUNT).await? {
        return Ok(account);
    }

    accounts::ActiveModel {
        id: Set(Uuid::now_v7()),
        user_id: Set(user_id),
        name: Set(DEFAULT_TRADING_ACCOUNT.to_string()),
        broker: Set(None),
        currency: Set(CurrencyCode::default().as_str().to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await
}

/// Applies a signed quantity change to a holding. A holding that ends flat
/// is removed.
///
/// # Errors
///
/// Returns `TradingError::Overflow` if the position leaves the decimal range,
/// or a database error if the write fails.
pub async fn adjust_holding<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    account_id: Uuid,
    symbol: &str,
    delta: Decimal,
    price: Option<Decimal>,
) -> Result<(), JournalError> {
    let existing = find_holding(conn, account_id, symbol).await?;
    let current = existing.as_ref().map(|h| Position {
        quantity: h.quantity,
        avg_cost: h.avg_cost,
    });
    let now: DateTimeWithTimeZone = Utc::now().into();

    match (existing, apply_delta(current, delta, price)?) {
        (Some(row), None) => {
            debug!(symbol, %account_id, "Holding closed out");
            row.delete(conn).await?;
        }
        (Some(row), Some(position)) => {
            let mut active: holdings::ActiveModel = row.into();
            active.quantity = Set(position.quantity);
            active.avg_cost = Set(position.avg_cost);
            active.updated_at = Set(now);
            active.update(conn).await?;
        }
        (None, Some(position)) => {
            holdings::ActiveModel {
                id: Set(Uuid::now_v7()),
                user_id: Set(user_id),
                account_id: Set(account_id),
                symbol: Set(symbol.to_string()),
                quantity: Set(position.quantity),
                avg_cost: Set(position.avg_cost),
                updated_at: Set(now),
            }
            .insert(conn)
            .await?;
        }
        (None, None) => {}
    }

    Ok(())
}

async fn find_by_name<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    name: &str,
) -> Result<Option<accounts::Model>, DbErr> {
    accounts::Entity::find()
        .filter(accounts::Column::UserId.eq(user_id))
        .filter(accounts::Column::Name.eq(name))
        .one(conn)
        .await
}

async fn find_holding<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
    symbol: &str,
) -> Result<Option<holdings::Model>, DbErr> {
    holdings::Entity::find()
        .filter(holdings::Column::AccountId.eq(account_id))
        .filter(holdings::Column::Symbol.eq(symbol))
        .one(conn)
        .await
}
