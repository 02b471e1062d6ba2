//! Budget journal routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiResult, middleware::auth::AuthUser, routes::parse_date};
use million_core::budget::{BudgetKind, validate_budget_line};
use million_db::{
    entities::budget_entries,
    repositories::{BudgetRepository, NewBudgetEntry},
};
use million_shared::AppError;

/// Creates the budget router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/budget", get(list_budget).post(create_budget_entry))
}

/// Body of `POST /budget`.
#[derive(Debug, Deserialize)]
pub struct CreateBudgetRequest {
    /// Category label.
    pub category: String,
    /// `expense`, `income` or `asset`.
    #[serde(default, rename = "type", alias = "kind")]
    pub kind: Option<String>,
    /// Positive amount.
    pub amount: Decimal,
    /// Date; today if absent.
    #[serde(default, alias = "entry_date")]
    pub date: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A budget line.
#[derive(Debug, Serialize)]
pub struct BudgetEntryResponse {
    /// Entry ID.
    pub id: Uuid,
    /// Category.
    pub category: String,
    /// Kind.
    #[serde(rename = "type")]
    pub kind: BudgetKind,
    /// Amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Date.
    pub date: NaiveDate,
    /// Description.
    pub description: Option<String>,
    /// Recorded at.
    pub created_at: DateTime<Utc>,
}

impl From<budget_entries::Model> for BudgetEntryResponse {
    fn from(b: budget_entries::Model) -> Self {
        Self {
            id: b.id,
            category: b.category,
            kind: b.kind.into(),
            amount: b.amount,
            date: b.entry_date,
            description: b.description,
            created_at: b.created_at.with_timezone(&Utc),
        }
    }
}

/// GET /budget
async fn list_budget(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<BudgetEntryResponse>>> {
    let entries = BudgetRepository::new((*state.db).clone())
        .list(auth.user_id())
        .await?;

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// POST /budget
async fn create_budget_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateBudgetRequest>,
) -> ApiResult<impl IntoResponse> {
    let category =
        validate_budget_line(&payload.category, payload.amount).map_err(AppError::Validation)?;
    let kind = BudgetKind::parse(payload.kind.as_deref()).map_err(AppError::Validation)?;
    let entry_date =
        parse_date("date", payload.date.as_deref())?.unwrap_or_else(|| Utc::now().date_naive());

    let entry = BudgetRepository::new((*state.db).clone())
        .create(NewBudgetEntry {
            user_id: auth.user_id(),
            category,
            kind,
            amount: payload.amount,
            entry_date,
            description: payload.description.filter(|d| !d.trim().is_empty()),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(BudgetEntryResponse::from(entry))))
}
