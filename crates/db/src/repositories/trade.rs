//! Trade repository.
//!
//! Every open trade is reflected in the default trading account's holdings.
//! Opening adds the signed quantity; closing or deleting an open trade takes
//! it back out.

use chrono::{DateTime, NaiveDate, Utc};
use million_core::trading::{
    Instrument, OptionType, TradeAction, TradingError, opening_delta, realized_pnl,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait, prelude::DateTimeWithTimeZone,
};
use tracing::info;
use uuid::Uuid;

use super::account::{adjust_holding, ensure_default_account};
use super::error::JournalError;
use super::order::{insert_event, mirror_client_order_id};
use crate::entities::{
    orders, trades,
    sea_orm_active_enums::{ActionType, OrderEventType, OrderState},
};

/// Input for opening a trade.
#[derive(Debug, Clone)]
pub struct NewTrade {
    /// Owner.
    pub user_id: Uuid,
    /// Upper-cased symbol.
    pub symbol: String,
    /// Stock or option.
    pub instrument: Instrument,
    /// Free-form strategy tag.
    pub strategy: Option<String>,
    /// Buy or sell.
    pub action: TradeAction,
    /// Positive quantity.
    pub quantity: i64,
    /// Positive entry price.
    pub entry_price: Decimal,
    /// Entry time.
    pub entry_date: DateTime<Utc>,
    /// Call or put, options only.
    pub option_type: Option<OptionType>,
    /// Strike, options only.
    pub strike_price: Option<Decimal>,
    /// Expiry, options only.
    pub expiry_date: Option<NaiveDate>,
    /// Idempotency key, unique per user.
    pub client_order_id: Option<String>,
}

/// Partial update of a trade. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct TradeUpdate {
    /// New symbol.
    pub symbol: Option<String>,
    /// New instrument.
    pub instrument: Option<Instrument>,
    /// New strategy.
    pub strategy: Option<String>,
    /// New action.
    pub action: Option<TradeAction>,
    /// New quantity.
    pub quantity: Option<i64>,
    /// New entry price.
    pub entry_price: Option<Decimal>,
    /// New entry time.
    pub entry_date: Option<DateTime<Utc>>,
}

/// Trade repository.
#[derive(Debug, Clone)]
pub struct TradeRepository {
    db: DatabaseConnection,
}

impl TradeRepository {
    /// Creates a new trade repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a trade together with a filled order and the holdings change.
    ///
    /// Returns the trade and whether it was newly created; a repeated
    /// `client_order_id` returns the existing trade.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails; nothing is persisted.
    pub async fn create(&self, input: NewTrade) -> Result<(trades::Model, bool), JournalError> {
        let txn = self.db.begin().await?;

        if let Some(coid) = input.client_order_id.as_deref() {
            let existing = trades::Entity::find()
                .filter(trades::Column::UserId.eq(input.user_id))
                .filter(trades::Column::ClientOrderId.eq(coid))
                .one(&txn)
                .await?;
            if let Some(trade) = existing {
                return Ok((trade, false));
            }
        }

        let trade = open_trade(&txn, input).await?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let order = orders::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(trade.user_id),
            symbol: Set(trade.symbol.clone()),
            instrument: Set(trade.instrument),
            action: Set(trade.action),
            strategy: Set(trade.strategy.clone()),
            quantity: Set(trade.quantity),
            limit_price: Set(None),
            status: Set(OrderState::Filled),
            filled_price: Set(Some(trade.entry_price)),
            filled_at: Set(Some(trade.entry_date)),
            trade_id: Set(Some(trade.id)),
            client_order_id: Set(Some(mirror_client_order_id(&trade))),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;
        insert_event(&txn, &order, OrderEventType::Created, None).await?;
        insert_event(&txn, &order, OrderEventType::Filled, Some(format!("trade {}", trade.id)))
            .await?;

        txn.commit().await?;

        info!(trade_id = %trade.id, symbol = %trade.symbol, "Trade recorded");
        Ok((trade, true))
    }

    /// Lists the user's trades, newest entry first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<trades::Model>, DbErr> {
        trades::Entity::find()
            .filter(trades::Column::UserId.eq(user_id))
            .order_by_desc(trades::Column::EntryDate)
            .order_by_desc(trades::Column::Id)
            .all(&self.db)
            .await
    }

    /// Finds one of the user's trades.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::NotFound` if missing or not the user's.
    pub async fn find(&self, user_id: Uuid, id: Uuid) -> Result<trades::Model, JournalError> {
        owned(&self.db, user_id, id).await
    }

    /// Applies a partial update. Holdings follow if the trade is open; the
    /// realized P&L is recomputed if it is closed.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::NotFound` if missing or not the user's.
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: TradeUpdate,
    ) -> Result<trades::Model, JournalError> {
        let txn = self.db.begin().await?;
        let trade = owned(&txn, user_id, id).await?;

        if !trade.is_closed {
            reverse_holding(&txn, &trade).await?;
        }

        let mut active: trades::ActiveModel = trade.clone().into();
        if let Some(symbol) = update.symbol {
            active.symbol = Set(symbol);
        }
        if let Some(instrument) = update.instrument {
            active.instrument = Set(instrument.into());
        }
        if let Some(strategy) = update.strategy {
            active.strategy = Set(Some(strategy));
        }
        if let Some(action) = update.action {
            active.action = Set(action.into());
        }
        if let Some(quantity) = update.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(price) = update.entry_price {
            active.entry_price = Set(price);
        }
        if let Some(date) = update.entry_date {
            active.entry_date = Set(date.into());
        }

        if let (true, Some(exit_price)) = (trade.is_closed, trade.exit_price) {
            let action = update.action.unwrap_or_else(|| trade.action.into());
            let entry = update.entry_price.unwrap_or(trade.entry_price);
            let quantity = update.quantity.unwrap_or(trade.quantity);
            active.realized_pnl = Set(Some(realized_pnl(action, entry, exit_price, quantity)?));
        }

        let updated = active.update(&txn).await?;

        if !updated.is_closed {
            adjust_holding(
                &txn,
                user_id,
                ensure_default_account(&txn, user_id).await?.id,
                &updated.symbol,
                opening_delta(updated.action.into(), updated.quantity),
                Some(updated.entry_price),
            )
            .await?;
        }

        txn.commit().await?;
        Ok(updated)
    }

    /// Closes a trade and books its realized P&L.
    ///
    /// # Errors
    ///
    /// Returns `TradingError::AlreadyClosed` for a closed trade and
    /// `JournalError::NotFound` if missing or not the user's.
    pub async fn close(
        &self,
        user_id: Uuid,
        id: Uuid,
        exit_price: Decimal,
        exit_date: Option<DateTime<Utc>>,
    ) -> Result<trades::Model, JournalError> {
        let txn = self.db.begin().await?;
        let trade = owned(&txn, user_id, id).await?;

        if trade.is_closed {
            return Err(TradingError::AlreadyClosed.into());
        }

        reverse_holding(&txn, &trade).await?;

        let pnl = realized_pnl(trade.action.into(), trade.entry_price, exit_price, trade.quantity)?;
        let mut active: trades::ActiveModel = trade.into();
        active.is_closed = Set(true);
        active.exit_price = Set(Some(exit_price));
        active.exit_date = Set(Some(exit_date.unwrap_or_else(Utc::now).into()));
        active.realized_pnl = Set(Some(pnl));
        let closed = active.update(&txn).await?;

        txn.commit().await?;

        info!(trade_id = %closed.id, pnl = %pnl, "Trade closed");
        Ok(closed)
    }

    /// Deletes a trade and the filled order mirrored from it. An open trade's
    /// quantity is taken out of holdings first.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::NotFound` if missing or not the user's.
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), JournalError> {
        let txn = self.db.begin().await?;
        let trade = owned(&txn, user_id, id).await?;

        if !trade.is_closed {
            reverse_holding(&txn, &trade).await?;
        }

        orders::Entity::delete_many()
            .filter(orders::Column::UserId.eq(user_id))
            .filter(orders::Column::ClientOrderId.eq(mirror_client_order_id(&trade)))
            .exec(&txn)
            .await?;

        trade.delete(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}

/// Inserts an open trade and adds it to the default account's holdings.
pub(crate) async fn open_trade<C: ConnectionTrait>(
    conn: &C,
    input: NewTrade,
) -> Result<trades::Model, JournalError> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let trade = trades::ActiveModel {
        id: Set(Uuid::now_v7()),
        user_id: Set(input.user_id),
        symbol: Set(input.symbol),
        instrument: Set(input.instrument.into()),
        strategy: Set(input.strategy),
        action: Set(ActionType::from(input.action)),
        quantity: Set(input.quantity),
        entry_price: Set(input.entry_price),
        entry_date: Set(input.entry_date.into()),
        is_closed: Set(false),
        exit_price: Set(None),
        exit_date: Set(None),
        realized_pnl: Set(None),
        option_type: Set(input.option_type.map(Into::into)),
        strike_price: Set(input.strike_price),
        expiry_date: Set(input.expiry_date),
        client_order_id: Set(input.client_order_id),
        created_at: Set(now),
    }
    .insert(conn)
    .await?;

    let account = ensure_default_account(conn, trade.user_id).await?;
    adjust_holding(
        conn,
        trade.user_id,
        account.id,
        &trade.symbol,
        opening_delta(input.action, trade.quantity),
        Some(trade.entry_price),
    )
    .await?;

    Ok(trade)
}

async fn reverse_holding<C: ConnectionTrait>(
    conn: &C,
    trade: &trades::Model,
) -> Result<(), JournalError> {
    let account = ensure_default_account(conn, trade.user_id).await?;
    adjust_holding(
        conn,
        trade.user_id,
        account.id,
        &trade.symbol,
        -opening_delta(trade.action.into(), trade.quantity),
        None,
    )
    .await
}

async fn owned<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    id: Uuid,
) -> Result<trades::Model, JournalError> {
    trades::Entity::find_by_id(id)
        .filter(trades::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| JournalError::not_found("Trade", id))
}
