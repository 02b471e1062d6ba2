//! Order repository.
//!
//! Orders are journal records with a small lifecycle:
//! `pending -> cancelled | filled`. Each transition appends an order event;
//! a fill opens a trade.

use chrono::{DateTime, Utc};
use million_core::trading::{
    Instrument, OrderStatus, TradeAction, validate_price,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::DateTimeWithTimeZone,
};
use tracing::info;
use uuid::Uuid;

use super::error::JournalError;
use super::trade::{NewTrade, open_trade};
use crate::entities::{
    order_events, orders, trades,
    sea_orm_active_enums::{OrderEventType, OrderState},
};

/// Input for recording an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Owner.
    pub user_id: Uuid,
    /// Upper-cased symbol.
    pub symbol: String,
    /// Stock or option.
    pub instrument: Instrument,
    /// Buy or sell.
    pub action: TradeAction,
    /// Free-form strategy tag.
    pub strategy: Option<String>,
    /// Positive quantity.
    pub quantity: i64,
    /// Limit price; `None` for a market order.
    pub limit_price: Option<Decimal>,
    /// Idempotency key, unique per user.
    pub client_order_id: Option<String>,
}

/// Client order ID of the filled order recorded alongside a manual trade.
#[must_use]
pub fn mirror_client_order_id(trade: &trades::Model) -> String {
    match trade.client_order_id.as_deref() {
        Some(coid) => format!("trade:{coid}"),
        None => format!("trade:{}", trade.id),
    }
}

/// Order repository.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    db: DatabaseConnection,
}

impl OrderRepository {
    /// Creates a new order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a pending order. A repeated `client_order_id` returns the
    /// existing order with `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn create(&self, input: NewOrder) -> Result<(orders::Model, bool), JournalError> {
        let txn = self.db.begin().await?;

        if let Some(coid) = input.client_order_id.as_deref() {
            let existing = orders::Entity::find()
                .filter(orders::Column::UserId.eq(input.user_id))
                .filter(orders::Column::ClientOrderId.eq(coid))
                .one(&txn)
                .await?;
            if let Some(order) = existing {
                return Ok((order, false));
            }
        }

        let order = orders::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(input.user_id),
            symbol: Set(input.symbol),
            instrument: Set(input.instrument.into()),
            action: Set(input.action.into()),
            strategy: Set(input.strategy),
            quantity: Set(input.quantity),
            limit_price: Set(input.limit_price),
            status: Set(OrderState::Pending),
            filled_price: Set(None),
            filled_at: Set(None),
            trade_id: Set(None),
            client_order_id: Set(input.client_order_id),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        insert_event(&txn, &order, OrderEventType::Created, None).await?;
        txn.commit().await?;

        info!(order_id = %order.id, symbol = %order.symbol, "Order recorded");
        Ok((order, true))
    }

    /// Lists the user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, user_id: Uuid, limit: u64) -> Result<Vec<orders::Model>, DbErr> {
        orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
    }

    /// Cancels a pending order.
    ///
    /// # Errors
    ///
    /// Returns `TradingError::InvalidTransition` unless the order is pending.
    pub async fn cancel(&self, user_id: Uuid, id: Uuid) -> Result<orders::Model, JournalError> {
        let txn = self.db.begin().await?;
        let order = owned(&txn, user_id, id).await?;

        OrderStatus::from(order.status).transition(OrderStatus::Cancelled)?;

        let mut active: orders::ActiveModel = order.into();
        active.status = Set(OrderState::Cancelled);
        let order = active.update(&txn).await?;

        insert_event(&txn, &order, OrderEventType::Cancelled, None).await?;
        txn.commit().await?;

        info!(order_id = %order.id, "Order cancelled");
        Ok(order)
    }

    /// Fills a pending order and opens the resulting trade.
    ///
    /// The fill price defaults to the limit price.
    ///
    /// # Errors
    ///
    /// - `TradingError::InvalidTransition` unless the order is pending
    /// - `JournalError::Validation` if neither a fill nor a limit price is known
    pub async fn fill(
        &self,
        user_id: Uuid,
        id: Uuid,
        filled_price: Option<Decimal>,
        filled_at: Option<DateTime<Utc>>,
    ) -> Result<(orders::Model, trades::Model), JournalError> {
        let txn = self.db.begin().await?;
        let order = owned(&txn, user_id, id).await?;

        OrderStatus::from(order.status).transition(OrderStatus::Filled)?;

        let price = filled_price
            .or(order.limit_price)
            .ok_or_else(|| JournalError::Validation("filled_price is required".into()))?;
        let price = validate_price("filled_price", price)?;
        let filled_at = filled_at.unwrap_or_else(Utc::now);

        let trade = open_trade(
            &txn,
            NewTrade {
                user_id,
                symbol: order.symbol.clone(),
                instrument: order.instrument.into(),
                strategy: order.strategy.clone(),
                action: order.action.into(),
                quantity: order.quantity,
                entry_price: price,
                entry_date: filled_at,
                option_type: None,
                strike_price: None,
                expiry_date: None,
                client_order_id: None,
            },
        )
        .await?;

        let mut active: orders::ActiveModel = order.into();
        active.status = Set(OrderState::Filled);
        active.filled_price = Set(Some(price));
        active.filled_at = Set(Some(filled_at.into()));
        active.trade_id = Set(Some(trade.id));
        let order = active.update(&txn).await?;

        insert_event(&txn, &order, OrderEventType::Filled, Some(format!("trade {}", trade.id)))
            .await?;
        txn.commit().await?;

        info!(order_id = %order.id, trade_id = %trade.id, "Order filled");
        Ok((order, trade))
    }

    /// Lifecycle events of one of the user's orders, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::NotFound` if missing or not the user's.
    pub async fn events(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Vec<order_events::Model>, JournalError> {
        owned(&self.db, user_id, id).await?;
        Ok(order_events::Entity::find()
            .filter(order_events::Column::OrderId.eq(id))
            .order_by_asc(order_events::Column::CreatedAt)
            .order_by_asc(order_events::Column::Id)
            .all(&self.db)
            .await?)
    }
}

/// Appends a lifecycle event for an order.
pub(crate) async fn insert_event<C: ConnectionTrait>(
    conn: &C,
    order: &orders::Model,
    event_type: OrderEventType,
    detail: Option<String>,
) -> Result<order_events::Model, DbErr> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    order_events::ActiveModel {
        id: Set(Uuid::now_v7()),
        order_id: Set(order.id),
        user_id: Set(order.user_id),
        event_type: Set(event_type),
        detail: Set(detail),
        created_at: Set(now),
    }
    .insert(conn)
    .await
}

async fn owned<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    id: Uuid,
) -> Result<orders::Model, JournalError> {
    orders::Entity::find_by_id(id)
        .filter(orders::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| JournalError::not_found("Order", id))
}
