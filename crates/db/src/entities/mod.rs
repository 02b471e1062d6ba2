//! `SeaORM` entities.

#![allow(missing_docs)]

pub mod prelude;

pub mod accounts;
pub mod auth_events;
pub mod auth_sessions;
pub mod budget_entries;
pub mod holdings;
pub mod ledger_accounts;
pub mod ledger_entries;
pub mod ledger_lines;
pub mod order_events;
pub mod orders;
pub mod refresh_tokens;
pub mod sea_orm_active_enums;
pub mod trades;
pub mod users;
