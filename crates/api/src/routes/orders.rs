//! Order routes: record, cancel, fill and inspect lifecycle events.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::trades::TradeResponse;
use crate::{AppState, error::ApiResult, middleware::auth::AuthUser, routes::parse_timestamp};
use million_core::trading::{
    Instrument, OrderEventKind, OrderStatus, TradeAction, normalize_symbol, validate_price,
    validate_quantity,
};
use million_db::{
    entities::{order_events, orders},
    repositories::{NewOrder, OrderRepository},
};
use million_shared::{AppError, types::LimitQuery};

/// Creates the orders router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}/cancel", post(cancel_order))
        .route("/orders/{id}/fill", post(fill_order))
        .route("/orders/{id}/events", get(list_events))
}

/// Body of `POST /orders`.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Ticker.
    pub symbol: String,
    /// `stock` or `option`.
    #[serde(default)]
    pub instrument: Option<String>,
    /// `buy` or `sell`.
    #[serde(default)]
    pub action: Option<String>,
    /// Strategy tag.
    #[serde(default)]
    pub strategy: Option<String>,
    /// Positive quantity.
    pub quantity: i64,
    /// Limit price; absent for a market order.
    #[serde(default)]
    pub limit_price: Option<Decimal>,
    /// Idempotency key.
    #[serde(default)]
    pub client_order_id: Option<String>,
}

/// Body of `POST /orders/{id}/fill`.
#[derive(Debug, Default, Deserialize)]
pub struct FillOrderRequest {
    /// Fill price; defaults to the limit price.
    #[serde(default)]
    pub filled_price: Option<Decimal>,
    /// Fill time; now if absent.
    #[serde(default)]
    pub filled_at: Option<String>,
}

/// An order.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// Order ID.
    pub id: Uuid,
    /// Ticker.
    pub symbol: String,
    /// Stock or option.
    pub instrument: Instrument,
    /// Buy or sell.
    pub action: TradeAction,
    /// Strategy tag.
    pub strategy: Option<String>,
    /// Quantity.
    pub quantity: i64,
    /// Limit price.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub limit_price: Option<Decimal>,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Fill price.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub filled_price: Option<Decimal>,
    /// Fill time.
    pub filled_at: Option<DateTime<Utc>>,
    /// Trade opened by the fill.
    pub trade_id: Option<Uuid>,
    /// Idempotency key.
    pub client_order_id: Option<String>,
    /// Recorded at.
    pub created_at: DateTime<Utc>,
}

impl From<orders::Model> for OrderResponse {
    fn from(o: orders::Model) -> Self {
        Self {
            id: o.id,
            symbol: o.symbol,
            instrument: o.instrument.into(),
            action: o.action.into(),
            strategy: o.strategy,
            quantity: o.quantity,
            limit_price: o.limit_price,
            status: o.status.into(),
            filled_price: o.filled_price,
            filled_at: o.filled_at.map(|d| d.with_timezone(&Utc)),
            trade_id: o.trade_id,
            client_order_id: o.client_order_id,
            created_at: o.created_at.with_timezone(&Utc),
        }
    }
}

/// An order lifecycle event.
#[derive(Debug, Serialize)]
pub struct OrderEventResponse {
    /// Event ID.
    pub id: Uuid,
    /// Order ID.
    pub order_id: Uuid,
    /// `created`, `cancelled` or `filled`.
    pub event_type: OrderEventKind,
    /// Detail.
    pub detail: Option<String>,
    /// When it happened.
    pub created_at: DateTime<Utc>,
}

impl From<order_events::Model> for OrderEventResponse {
    fn from(e: order_events::Model) -> Self {
        Self {
            id: e.id,
            order_id: e.order_id,
            event_type: e.event_type.into(),
            detail: e.detail,
            created_at: e.created_at.with_timezone(&Utc),
        }
    }
}

/// A filled order and the trade it opened.
#[derive(Debug, Serialize)]
pub struct FillResponse {
    /// The order, now filled.
    pub order: OrderResponse,
    /// The new trade.
    pub trade: TradeResponse,
}

/// GET /orders - Newest first.
async fn list_orders(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<OrderResponse>>> {
    let orders = OrderRepository::new((*state.db).clone())
        .list(auth.user_id(), query.clamped(100, 1000))
        .await?;

    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// POST /orders - Record a pending order. Idempotent on `client_order_id`.
async fn create_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = NewOrder {
        user_id: auth.user_id(),
        symbol: normalize_symbol(&payload.symbol)?,
        instrument: Instrument::parse(payload.instrument.as_deref())?,
        action: TradeAction::parse(payload.action.as_deref())?,
        strategy: payload.strategy.filter(|s| !s.trim().is_empty()),
        quantity: validate_quantity(payload.quantity)?,
        limit_price: payload
            .limit_price
            .map(|p| validate_price("limit_price", p))
            .transpose()?,
        client_order_id: payload
            .client_order_id
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
    };

    let (order, created) = OrderRepository::new((*state.db).clone())
        .create(input)
        .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(OrderResponse::from(order))))
}

/// POST /orders/{id}/cancel
async fn cancel_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<OrderResponse>> {
    let order = OrderRepository::new((*state.db).clone())
        .cancel(auth.user_id(), id)
        .await?;

    Ok(Json(order.into()))
}

/// POST /orders/{id}/fill - Fill and open the resulting trade. The body is
/// optional.
async fn fill_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> ApiResult<Json<FillResponse>> {
    let payload: FillOrderRequest = if body.iter().all(u8::is_ascii_whitespace) {
        FillOrderRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))?
    };
    let filled_at = parse_timestamp("filled_at", payload.filled_at.as_deref())?;

    let (order, trade) = OrderRepository::new((*state.db).clone())
        .fill(auth.user_id(), id, payload.filled_price, filled_at)
        .await?;

    Ok(Json(FillResponse {
        order: order.into(),
        trade: trade.into(),
    }))
}

/// GET /orders/{id}/events - Oldest first.
async fn list_events(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<OrderEventResponse>>> {
    let events = OrderRepository::new((*state.db).clone())
        .events(auth.user_id(), id)
        .await?;

    Ok(Json(events.into_iter().map(Into::into).collect()))
}
