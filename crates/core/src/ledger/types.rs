//! Ledger domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Side of a ledger line. Amounts are always positive; direction lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Debit line.
    Debit,
    /// Credit line.
    Credit,
}

impl Side {
    /// Returns the lowercase name used in storage and JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

/// Classification of a ledger account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerAccountKind {
    /// Things the user owns (cash).
    Asset,
    /// Things the user owes.
    Liability,
    /// Contributions and withdrawals of capital (external cash clearing).
    Equity,
    /// Income.
    Income,
    /// Expenses.
    Expense,
}

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Cash moved into the user's cash account.
    CashDeposit,
    /// Cash moved out of the user's cash account.
    CashWithdraw,
}

/// Direction of a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashDirection {
    /// Money in.
    Deposit,
    /// Money out.
    Withdraw,
}

impl CashDirection {
    /// Parses loosely formatted input (`"Deposit"`, `"DEPOSIT"`, `"d"`, `"withdrawal"`).
    ///
    /// A missing or blank value is a deposit.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::UnknownDirection` for anything else.
    pub fn parse(raw: Option<&str>) -> Result<Self, LedgerError> {
        let value = raw.map(str::trim).unwrap_or_default();
        if value.is_empty() {
            return Ok(Self::Deposit);
        }
        match value.to_ascii_uppercase().chars().next() {
            Some('D') => Ok(Self::Deposit),
            Some('W') => Ok(Self::Withdraw),
            _ => Err(LedgerError::UnknownDirection(value.to_string())),
        }
    }

    /// Entry kind recorded for this direction.
    #[must_use]
    pub const fn entry_kind(self) -> EntryKind {
        match self {
            Self::Deposit => EntryKind::CashDeposit,
            Self::Withdraw => EntryKind::CashWithdraw,
        }
    }

    /// Side the user's cash account takes for this direction.
    #[must_use]
    pub const fn cash_side(self) -> Side {
        match self {
            Self::Deposit => Side::Debit,
            Self::Withdraw => Side::Credit,
        }
    }
}

/// Debit and credit totals of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionTotals {
    /// Sum of debit lines.
    pub debit: Decimal,
    /// Sum of credit lines.
    pub credit: Decimal,
}

impl TransactionTotals {
    /// Creates totals from debit and credit sums.
    #[must_use]
    pub const fn new(debit: Decimal, credit: Decimal) -> Self {
        Self { debit, credit }
    }

    /// Returns true when debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.debit == self.credit
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(None, CashDirection::Deposit)]
    #[case(Some(""), CashDirection::Deposit)]
    #[case(Some("deposit"), CashDirection::Deposit)]
    #[case(Some("DEPOSIT"), CashDirection::Deposit)]
    #[case(Some(" d "), CashDirection::Deposit)]
    #[case(Some("withdraw"), CashDirection::Withdraw)]
    #[case(Some("Withdrawal"), CashDirection::Withdraw)]
    #[case(Some("W"), CashDirection::Withdraw)]
    fn test_direction_parse(#[case] raw: Option<&str>, #[case] expected: CashDirection) {
        assert_eq!(CashDirection::parse(raw).unwrap(), expected);
    }

    #[test]
    fn test_direction_unknown() {
        assert!(matches!(
            CashDirection::parse(Some("transfer")),
            Err(LedgerError::UnknownDirection(_))
        ));
    }

    #[test]
    fn test_direction_sides() {
        assert_eq!(CashDirection::Deposit.cash_side(), Side::Debit);
        assert_eq!(CashDirection::Withdraw.cash_side(), Side::Credit);
        assert_eq!(CashDirection::Deposit.entry_kind(), EntryKind::CashDeposit);
    }

    #[test]
    fn test_transaction_totals() {
        let totals = TransactionTotals::new(dec!(100.00), dec!(100.00));
        assert!(totals.is_balanced());
        assert_eq!(totals.difference(), Decimal::ZERO);

        let totals = TransactionTotals::new(dec!(100.00), dec!(50.00));
        assert!(!totals.is_balanced());
        assert_eq!(totals.difference(), dec!(50.00));
    }
}
