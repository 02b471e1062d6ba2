//! Ledger line domain type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use million_shared::types::LedgerAccountId;

use super::types::Side;

/// One leg of a ledger entry, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// The account affected by this line.
    pub account_id: LedgerAccountId,
    /// Debit or credit.
    pub side: Side,
    /// Strictly positive amount.
    pub amount: Decimal,
    /// Optional memo for this line.
    pub memo: Option<String>,
}

impl LedgerLine {
    /// Creates a debit line.
    #[must_use]
    pub const fn debit(account_id: LedgerAccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            side: Side::Debit,
            amount,
            memo: None,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub const fn credit(account_id: LedgerAccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            side: Side::Credit,
            amount,
            memo: None,
        }
    }

    /// Attaches a memo.
    #[must_use]
    pub fn with_memo(mut self, memo: Option<String>) -> Self {
        self.memo = memo;
        self
    }

    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.side {
            Side::Debit => self.amount,
            Side::Credit => -self.amount,
        }
    }
}
