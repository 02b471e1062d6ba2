//! API route definitions.

use axum::{Router, middleware};
use chrono::{DateTime, NaiveDate, Utc};
use million_shared::AppError;

use crate::{AppState, middleware::auth::auth_middleware};

pub mod accounts;
pub mod auth;
pub mod budget;
pub mod cash;
pub mod health;
pub mod ledger;
pub mod orders;
pub mod trades;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(cash::routes())
        .merge(ledger::routes())
        .merge(trades::routes())
        .merge(orders::routes())
        .merge(accounts::routes())
        .merge(budget::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::public_routes())
        .merge(protected_routes)
}

/// Parses an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
/// Blank input is `None`.
pub(crate) fn parse_timestamp(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<DateTime<Utc>>, AppError> {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Some(dt.and_utc()))
        .ok_or_else(|| AppError::Validation(format!("Invalid {field}: {value:?}")))
}

/// Parses a `YYYY-MM-DD` date, also accepting a full timestamp.
pub(crate) fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    Ok(parse_timestamp(field, raw)?.map(|ts| ts.date_naive()))
}
