//! Read-only ledger routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{AppState, error::ApiResult, middleware::auth::AuthUser};
use million_core::ledger::{EntryKind, LedgerAccountKind, Side};
use million_db::repositories::{AccountWithBalance, EntryLineRow, LedgerRepository};
use million_shared::types::LimitQuery;

/// Creates the ledger router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ledger/accounts", get(list_accounts))
        .route("/ledger/entries", get(list_entries))
}

/// A ledger account with derived totals.
#[derive(Debug, Serialize)]
pub struct LedgerAccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Account name.
    pub name: String,
    /// Classification.
    pub kind: LedgerAccountKind,
    /// Currency.
    pub currency: String,
    /// Sum of debit lines.
    #[serde(with = "rust_decimal::serde::float")]
    pub debit_total: Decimal,
    /// Sum of credit lines.
    #[serde(with = "rust_decimal::serde::float")]
    pub credit_total: Decimal,
    /// Debits minus credits.
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

impl From<AccountWithBalance> for LedgerAccountResponse {
    fn from(row: AccountWithBalance) -> Self {
        Self {
            id: row.account.id,
            name: row.account.name,
            kind: row.account.kind.into(),
            currency: row.account.currency,
            debit_total: row.balance.debit_total,
            credit_total: row.balance.credit_total,
            balance: row.balance.balance(),
        }
    }
}

/// One ledger line joined with its entry and account.
#[derive(Debug, Serialize)]
pub struct EntryLineResponse {
    /// Entry ID.
    pub entry_id: Uuid,
    /// Entry kind.
    pub entry_type: EntryKind,
    /// Entry description.
    pub description: String,
    /// Entry effective time.
    pub effective_at: DateTime<Utc>,
    /// Entry creation time.
    pub created_at: DateTime<Utc>,
    /// Replay protection key.
    pub idempotency_key: Option<String>,
    /// Line ID.
    pub line_id: Uuid,
    /// Account ID.
    pub account_id: Uuid,
    /// Account name.
    pub account_name: String,
    /// Account currency.
    pub currency: String,
    /// Debit or credit.
    pub side: Side,
    /// Line amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Line memo.
    pub memo: Option<String>,
}

impl From<EntryLineRow> for EntryLineResponse {
    fn from(row: EntryLineRow) -> Self {
        Self {
            entry_id: row.entry_id,
            entry_type: row.entry_type,
            description: row.description,
            effective_at: row.effective_at,
            created_at: row.created_at,
            idempotency_key: row.idempotency_key,
            line_id: row.line_id,
            account_id: row.account_id,
            account_name: row.account_name,
            currency: row.currency,
            side: row.side,
            amount: row.amount,
            memo: row.memo,
        }
    }
}

/// GET /ledger/accounts - Ledger accounts with balances.
async fn list_accounts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<LedgerAccountResponse>>> {
    let accounts = LedgerRepository::new((*state.db).clone())
        .balances(auth.user_id())
        .await?;

    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// GET /ledger/entries - Recent entries, one row per line.
async fn list_entries(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<EntryLineResponse>>> {
    let rows = LedgerRepository::new((*state.db).clone())
        .list_entries(auth.user_id(), query.clamped(100, 1000))
        .await?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
