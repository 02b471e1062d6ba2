//! Trade journal routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiResult,
    middleware::auth::AuthUser,
    routes::{parse_date, parse_timestamp},
};
use million_core::trading::{
    Instrument, OptionType, TradeAction, normalize_symbol, validate_price, validate_quantity,
};
use million_db::{
    entities::trades,
    repositories::{NewTrade, TradeRepository, TradeUpdate},
};
use million_shared::AppError;

/// Creates the trades router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/trades", get(list_trades).post(create_trade))
        .route("/trades/{id}", put(update_trade).delete(delete_trade))
        .route("/trades/{id}/close", post(close_trade))
}

/// Body of `POST /trades`.
#[derive(Debug, Deserialize)]
pub struct CreateTradeRequest {
    /// Ticker.
    pub symbol: String,
    /// `stock` or `option`.
    #[serde(default)]
    pub instrument: Option<String>,
    /// Strategy tag.
    #[serde(default)]
    pub strategy: Option<String>,
    /// `buy` or `sell`.
    #[serde(default)]
    pub action: Option<String>,
    /// Positive quantity.
    pub quantity: i64,
    /// Positive entry price.
    #[serde(alias = "price")]
    pub entry_price: Decimal,
    /// Entry date or timestamp; now if absent.
    #[serde(default, alias = "date")]
    pub entry_date: Option<String>,
    /// `call` or `put`.
    #[serde(default)]
    pub option_type: Option<String>,
    /// Strike.
    #[serde(default)]
    pub strike_price: Option<Decimal>,
    /// Expiry date.
    #[serde(default)]
    pub expiry_date: Option<String>,
    /// Idempotency key.
    #[serde(default)]
    pub client_order_id: Option<String>,
}

/// Body of `PUT /trades/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTradeRequest {
    /// Ticker.
    pub symbol: Option<String>,
    /// `stock` or `option`.
    pub instrument: Option<String>,
    /// Strategy tag.
    pub strategy: Option<String>,
    /// `buy` or `sell`.
    pub action: Option<String>,
    /// Positive quantity.
    pub quantity: Option<i64>,
    /// Positive entry price.
    #[serde(alias = "price")]
    pub entry_price: Option<Decimal>,
    /// Entry date or timestamp.
    #[serde(alias = "date")]
    pub entry_date: Option<String>,
}

/// Body of `POST /trades/{id}/close`.
#[derive(Debug, Deserialize)]
pub struct CloseTradeRequest {
    /// Positive exit price.
    pub exit_price: Decimal,
    /// Exit date or timestamp; now if absent.
    #[serde(default)]
    pub exit_date: Option<String>,
}

/// A trade.
#[derive(Debug, Serialize)]
pub struct TradeResponse {
    /// Trade ID.
    pub id: Uuid,
    /// Ticker.
    pub symbol: String,
    /// Stock or option.
    pub instrument: Instrument,
    /// Strategy tag.
    pub strategy: Option<String>,
    /// Buy or sell.
    pub action: TradeAction,
    /// Quantity.
    pub quantity: i64,
    /// Entry price.
    #[serde(with = "rust_decimal::serde::float")]
    pub entry_price: Decimal,
    /// Entry time.
    pub entry_date: DateTime<Utc>,
    /// Closed flag.
    pub is_closed: bool,
    /// Exit price.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub exit_price: Option<Decimal>,
    /// Exit time.
    pub exit_date: Option<DateTime<Utc>>,
    /// Realized P&L once closed.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub realized_pnl: Option<Decimal>,
    /// Call or put.
    pub option_type: Option<OptionType>,
    /// Strike.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub strike_price: Option<Decimal>,
    /// Expiry.
    pub expiry_date: Option<NaiveDate>,
    /// Idempotency key.
    pub client_order_id: Option<String>,
    /// Recorded at.
    pub created_at: DateTime<Utc>,
}

impl From<trades::Model> for TradeResponse {
    fn from(t: trades::Model) -> Self {
        Self {
            id: t.id,
            symbol: t.symbol,
            instrument: t.instrument.into(),
            strategy: t.strategy,
            action: t.action.into(),
            quantity: t.quantity,
            entry_price: t.entry_price,
            entry_date: t.entry_date.with_timezone(&Utc),
            is_closed: t.is_closed,
            exit_price: t.exit_price,
            exit_date: t.exit_date.map(|d| d.with_timezone(&Utc)),
            realized_pnl: t.realized_pnl,
            option_type: t.option_type.map(Into::into),
            strike_price: t.strike_price,
            expiry_date: t.expiry_date,
            client_order_id: t.client_order_id,
            created_at: t.created_at.with_timezone(&Utc),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// GET /trades - The user's trades, newest first.
async fn list_trades(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<TradeResponse>>> {
    let trades = TradeRepository::new((*state.db).clone())
        .list(auth.user_id())
        .await?;

    Ok(Json(trades.into_iter().map(Into::into).collect()))
}

/// POST /trades - Record a trade. Idempotent on `client_order_id`.
async fn create_trade(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateTradeRequest>,
) -> ApiResult<impl IntoResponse> {
    let instrument = Instrument::parse(payload.instrument.as_deref())?;
    let option_type = OptionType::parse(payload.option_type.as_deref())?;
    let strike_price = payload
        .strike_price
        .map(|p| validate_price("strike_price", p))
        .transpose()?;

    if instrument == Instrument::Stock && (option_type.is_some() || strike_price.is_some()) {
        return Err(AppError::Validation("Option fields require instrument=option".into()).into());
    }

    let input = NewTrade {
        user_id: auth.user_id(),
        symbol: normalize_symbol(&payload.symbol)?,
        instrument,
        strategy: non_blank(payload.strategy),
        action: TradeAction::parse(payload.action.as_deref())?,
        quantity: validate_quantity(payload.quantity)?,
        entry_price: validate_price("entry_price", payload.entry_price)?,
        entry_date: parse_timestamp("entry_date", payload.entry_date.as_deref())?
            .unwrap_or_else(Utc::now),
        option_type,
        strike_price,
        expiry_date: parse_date("expiry_date", payload.expiry_date.as_deref())?,
        client_order_id: non_blank(payload.client_order_id),
    };

    let (trade, created) = TradeRepository::new((*state.db).clone())
        .create(input)
        .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(TradeResponse::from(trade))))
}

/// PUT /trades/{id} - Partial update.
async fn update_trade(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTradeRequest>,
) -> ApiResult<Json<TradeResponse>> {
    let update = TradeUpdate {
        symbol: payload.symbol.as_deref().map(normalize_symbol).transpose()?,
        instrument: payload
            .instrument
            .as_deref()
            .map(|v| Instrument::parse(Some(v)))
            .transpose()?,
        strategy: payload.strategy,
        action: payload
            .action
            .as_deref()
            .map(|v| TradeAction::parse(Some(v)))
            .transpose()?,
        quantity: payload.quantity.map(validate_quantity).transpose()?,
        entry_price: payload
            .entry_price
            .map(|p| validate_price("entry_price", p))
            .transpose()?,
        entry_date: parse_timestamp("entry_date", payload.entry_date.as_deref())?,
    };

    let trade = TradeRepository::new((*state.db).clone())
        .update(auth.user_id(), id, update)
        .await?;

    Ok(Json(trade.into()))
}

/// POST /trades/{id}/close - Close and book P&L.
async fn close_trade(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CloseTradeRequest>,
) -> ApiResult<Json<TradeResponse>> {
    let exit_price = validate_price("exit_price", payload.exit_price)?;
    let exit_date = parse_timestamp("exit_date", payload.exit_date.as_deref())?;

    let trade = TradeRepository::new((*state.db).clone())
        .close(auth.user_id(), id, exit_price, exit_date)
        .await?;

    Ok(Json(trade.into()))
}

/// DELETE /trades/{id}
async fn delete_trade(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    TradeRepository::new((*state.db).clone())
        .delete(auth.user_id(), id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
