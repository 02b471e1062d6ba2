//! Cash routes. Every movement is a balanced ledger entry; nothing here
//! stores a running balance.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiResult, middleware::auth::AuthUser, routes::parse_timestamp};
use million_core::ledger::{CashDirection, EntryKind, LedgerError, Side};
use million_db::repositories::{CashMovement, CashPosting, LedgerRepository, PostedEntry};
use million_shared::{
    AppError,
    types::{CurrencyCode, LimitQuery},
};

/// Creates the cash router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cash", get(list_cash).post(add_cash))
        .route("/cash/add", post(add_cash))
        .route("/cash/balance", get(cash_balance))
}

/// Body of `POST /cash`. Field names follow the loose shapes clients send.
#[derive(Debug, Deserialize)]
pub struct CashRequest {
    /// Amount moved; must be positive.
    pub amount: Option<Decimal>,
    /// `deposit` or `withdraw`, matched on the first letter.
    #[serde(default, alias = "type", alias = "action")]
    pub direction: Option<String>,
    /// Cash ledger account to post to.
    #[serde(default)]
    pub account_id: Option<Uuid>,
    /// Currency code.
    #[serde(default)]
    pub currency: Option<String>,
    /// Free-form note.
    #[serde(default, alias = "notes")]
    pub note: Option<String>,
    /// Effective date or timestamp.
    #[serde(default)]
    pub date: Option<String>,
    /// Replay protection key.
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// `?currency=` for the balance endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct BalanceQuery {
    /// Currency code, default USD.
    pub currency: Option<String>,
}

/// A ledger line in a posting response.
#[derive(Debug, Serialize)]
pub struct LineResponse {
    /// Line ID.
    pub id: Uuid,
    /// Ledger account.
    pub account_id: Uuid,
    /// Debit or credit.
    pub side: Side,
    /// Positive amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Memo.
    pub memo: Option<String>,
}

/// A posted cash entry.
#[derive(Debug, Serialize)]
pub struct EntryResponse {
    /// Entry ID.
    pub entry_id: Uuid,
    /// `cash_deposit` or `cash_withdraw`.
    pub entry_type: EntryKind,
    /// Description.
    pub description: String,
    /// Effective time.
    pub effective_at: DateTime<Utc>,
    /// Replay protection key.
    pub idempotency_key: Option<String>,
    /// False when an earlier entry with the same key was returned.
    pub created: bool,
    /// The balanced lines.
    pub lines: Vec<LineResponse>,
}

impl From<PostedEntry> for EntryResponse {
    fn from(posted: PostedEntry) -> Self {
        Self {
            entry_id: posted.entry.id,
            entry_type: posted.entry.entry_type.into(),
            description: posted.entry.description,
            effective_at: posted.entry.effective_at.with_timezone(&Utc),
            idempotency_key: posted.entry.idempotency_key,
            created: posted.created,
            lines: posted
                .lines
                .into_iter()
                .map(|line| LineResponse {
                    id: line.id,
                    account_id: line.account_id,
                    side: line.side.into(),
                    amount: line.amount,
                    memo: line.memo,
                })
                .collect(),
        }
    }
}

/// A cash movement derived from the ledger.
#[derive(Debug, Serialize)]
pub struct CashMovementResponse {
    /// Ledger entry ID.
    pub id: Uuid,
    /// `deposit` or `withdraw`.
    pub action: CashDirection,
    /// Amount moved.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Currency.
    pub currency: String,
    /// Cash ledger account.
    pub account_id: Uuid,
    /// Effective time.
    pub date: DateTime<Utc>,
    /// Note.
    pub notes: Option<String>,
}

impl From<CashMovement> for CashMovementResponse {
    fn from(m: CashMovement) -> Self {
        Self {
            id: m.entry_id,
            action: m.direction,
            amount: m.amount,
            currency: m.currency,
            account_id: m.account_id,
            date: m.effective_at,
            notes: m.note,
        }
    }
}

/// Derived cash balance.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Currency.
    pub currency: String,
    /// Debits minus credits on the user's cash accounts in that currency.
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

/// GET /cash - Cash movements, newest first.
async fn list_cash(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<CashMovementResponse>>> {
    let movements = LedgerRepository::new((*state.db).clone())
        .list_cash(auth.user_id(), query.clamped(100, 1000))
        .await?;

    Ok(Json(movements.into_iter().map(Into::into).collect()))
}

/// POST /cash, POST /cash/add - Deposit or withdraw.
///
/// Returns 201 for a new entry and 200 when an idempotency key replays an
/// earlier one.
async fn add_cash(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CashRequest>,
) -> ApiResult<impl IntoResponse> {
    let amount = payload
        .amount
        .ok_or_else(|| AppError::Validation("amount is required".into()))?;
    let direction = CashDirection::parse(payload.direction.as_deref())?;

    let currency = payload
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(CurrencyCode::parse)
        .transpose()
        .map_err(LedgerError::InvalidCurrency)?;

    let posting = CashPosting {
        user_id: auth.user_id(),
        direction,
        amount,
        currency,
        account_id: payload.account_id,
        note: payload.note,
        effective_at: parse_timestamp("date", payload.date.as_deref())?,
        idempotency_key: payload
            .idempotency_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty()),
    };

    let posted = LedgerRepository::new((*state.db).clone())
        .post_cash(posting)
        .await?;

    let status = if posted.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(EntryResponse::from(posted))))
}

/// GET /cash/balance - Balance for one currency.
async fn cash_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<BalanceQuery>,
) -> ApiResult<Json<BalanceResponse>> {
    let currency = CurrencyCode::parse_or_default(query.currency.as_deref())
        .map_err(LedgerError::InvalidCurrency)?;

    let balance = LedgerRepository::new((*state.db).clone())
        .cash_balance(auth.user_id(), &currency)
        .await?;

    Ok(Json(BalanceResponse {
        currency: currency.as_str().to_string(),
        balance,
    }))
}
