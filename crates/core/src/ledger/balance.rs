//! Balance derivation.
//!
//! Balances are never stored. They are recomputed from ledger lines with the
//! system-wide convention `balance = debits - credits`, so a cash (asset)
//! account with deposits has a positive balance.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::types::Side;

/// Running debit and credit totals for one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Total debit amount.
    pub debit_total: Decimal,
    /// Total credit amount.
    pub credit_total: Decimal,
}

impl AccountBalance {
    /// Sums an account's lines.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Overflow` if either total leaves the decimal range.
    pub fn from_lines<I>(lines: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = (Side, Decimal)>,
    {
        let mut balance = Self::default();
        for (side, amount) in lines {
            balance.add(side, amount)?;
        }
        Ok(balance)
    }

    /// Adds one line.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Overflow` if the total leaves the decimal range.
    pub fn add(&mut self, side: Side, amount: Decimal) -> Result<(), LedgerError> {
        let total = match side {
            Side::Debit => &mut self.debit_total,
            Side::Credit => &mut self.credit_total,
        };
        *total = total.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Net balance, `debits - credits`.
    ///
    /// Both totals are sums of positive amounts, so the difference stays in range.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.debit_total - self.credit_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn side_strategy() -> impl Strategy<Value = Side> {
        prop_oneof![Just(Side::Debit), Just(Side::Credit)]
    }

    fn line_strategy() -> impl Strategy<Value = (Side, Decimal)> {
        (side_strategy(), (1i64..100_000_000i64).prop_map(|c| Decimal::new(c, 2)))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// The aggregate equals an independent recomputation from raw lines.
        #[test]
        fn prop_balance_matches_recomputation(lines in prop::collection::vec(line_strategy(), 0..50)) {
            let aggregate = AccountBalance::from_lines(lines.iter().copied()).unwrap();

            let debits: Decimal = lines.iter().filter(|(s, _)| *s == Side::Debit).map(|(_, a)| *a).sum();
            let credits: Decimal = lines.iter().filter(|(s, _)| *s == Side::Credit).map(|(_, a)| *a).sum();

            prop_assert_eq!(aggregate.balance(), debits - credits);
        }

        /// Line order does not change the balance.
        #[test]
        fn prop_order_independent(lines in prop::collection::vec(line_strategy(), 0..30)) {
            let forward = AccountBalance::from_lines(lines.iter().copied()).unwrap();
            let backward = AccountBalance::from_lines(lines.iter().rev().copied()).unwrap();
            prop_assert_eq!(forward, backward);
        }
    }

    #[test]
    fn test_no_lines_is_zero() {
        assert_eq!(AccountBalance::from_lines([]).unwrap().balance(), Decimal::ZERO);
    }

    #[test]
    fn test_deposit_then_withdraw() {
        let balance =
            AccountBalance::from_lines([(Side::Debit, dec!(100)), (Side::Credit, dec!(40))])
                .unwrap();
        assert_eq!(balance.balance(), dec!(60));
    }

    #[test]
    fn test_overdraft_goes_negative() {
        let balance =
            AccountBalance::from_lines([(Side::Debit, dec!(100)), (Side::Credit, dec!(150))])
                .unwrap();
        assert_eq!(balance.balance(), dec!(-50));
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let result =
            AccountBalance::from_lines([(Side::Debit, Decimal::MAX), (Side::Debit, dec!(1))]);
        assert_eq!(result, Err(LedgerError::Overflow));

        let mut balance = AccountBalance::default();
        balance.add(Side::Credit, Decimal::MAX).unwrap();
        assert_eq!(balance.add(Side::Credit, Decimal::MAX), Err(LedgerError::Overflow));
        assert_eq!(balance.credit_total, Decimal::MAX);
    }
}
