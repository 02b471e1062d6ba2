//! Brokerage accounts and holdings.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiResult, middleware::auth::AuthUser};
use million_core::trading::{normalize_symbol, validate_holding_quantity, validate_price};
use million_db::{
    entities::{accounts, holdings},
    repositories::{AccountRepository, CreateAccountInput, UpsertHoldingInput},
};
use million_shared::{AppError, types::CurrencyCode};

/// Creates the accounts router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/{id}/holdings",
            get(list_holdings).put(upsert_holding),
        )
}

/// Body of `POST /accounts`.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Display name, unique per user.
    pub name: String,
    /// Broker.
    #[serde(default)]
    pub broker: Option<String>,
    /// Currency, default USD.
    #[serde(default)]
    pub currency: Option<String>,
}

/// Body of `PUT /accounts/{id}/holdings`.
#[derive(Debug, Deserialize)]
pub struct UpsertHoldingRequest {
    /// Ticker.
    pub symbol: String,
    /// Signed quantity.
    pub quantity: Decimal,
    /// Average cost.
    #[serde(default)]
    pub avg_cost: Option<Decimal>,
}

/// A brokerage account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Broker.
    pub broker: Option<String>,
    /// Currency.
    pub currency: String,
    /// Created at.
    pub created_at: DateTime<Utc>,
}

impl From<accounts::Model> for AccountResponse {
    fn from(a: accounts::Model) -> Self {
        Self {
            id: a.id,
            name: a.name,
            broker: a.broker,
            currency: a.currency,
            created_at: a.created_at.with_timezone(&Utc),
        }
    }
}

/// A position in one account.
#[derive(Debug, Serialize)]
pub struct HoldingResponse {
    /// Holding ID.
    pub id: Uuid,
    /// Account ID.
    pub account_id: Uuid,
    /// Ticker.
    pub symbol: String,
    /// Signed quantity.
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    /// Average cost.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub avg_cost: Option<Decimal>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

impl From<holdings::Model> for HoldingResponse {
    fn from(h: holdings::Model) -> Self {
        Self {
            id: h.id,
            account_id: h.account_id,
            symbol: h.symbol,
            quantity: h.quantity,
            avg_cost: h.avg_cost,
            updated_at: h.updated_at.with_timezone(&Utc),
        }
    }
}

/// GET /accounts
async fn list_accounts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<AccountResponse>>> {
    let accounts = AccountRepository::new((*state.db).clone())
        .list(auth.user_id())
        .await?;

    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// POST /accounts
async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateAccountRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Account name is required".into()).into());
    }
    let currency =
        CurrencyCode::parse_or_default(payload.currency.as_deref()).map_err(AppError::Validation)?;

    let account = AccountRepository::new((*state.db).clone())
        .create(CreateAccountInput {
            user_id: auth.user_id(),
            name,
            broker: payload.broker.filter(|b| !b.trim().is_empty()),
            currency,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

/// GET /accounts/{id}/holdings
async fn list_holdings(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<Uuid>,
) -> ApiResult<Json<Vec<HoldingResponse>>> {
    let holdings = AccountRepository::new((*state.db).clone())
        .holdings(auth.user_id(), account_id)
        .await?;

    Ok(Json(holdings.into_iter().map(Into::into).collect()))
}

/// PUT /accounts/{id}/holdings - Insert or replace one symbol's position.
async fn upsert_holding(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<UpsertHoldingRequest>,
) -> ApiResult<Json<HoldingResponse>> {
    let holding = AccountRepository::new((*state.db).clone())
        .upsert_holding(
            auth.user_id(),
            account_id,
            UpsertHoldingInput {
                symbol: normalize_symbol(&payload.symbol)?,
                quantity: validate_holding_quantity(payload.quantity)?,
                avg_cost: payload
                    .avg_cost
                    .map(|c| validate_price("avg_cost", c))
                    .transpose()?,
            },
        )
        .await?;

    Ok(Json(holding.into()))
}
