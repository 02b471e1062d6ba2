//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Ledger lines (debits and credits)
//! - Entry validation
//! - Cash posting plans
//! - Balance derivation

pub mod balance;
pub mod error;
pub mod line;
pub mod posting;
pub mod types;
pub mod validation;

#[cfg(test)]
mod posting_props;

pub use balance::AccountBalance;
pub use error::LedgerError;
pub use line::LedgerLine;
pub use posting::{CASH_ACCOUNT_NAME, CLEARING_ACCOUNT_NAME, PostingPlan, plan_cash_posting};
pub use types::{CashDirection, EntryKind, LedgerAccountKind, Side, TransactionTotals};
pub use validation::{MAX_LINE_AMOUNT, validate_amount, validate_lines};
