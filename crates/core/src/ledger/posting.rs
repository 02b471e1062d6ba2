//! Cash posting: one cash movement becomes one balanced two-line entry.

use rust_decimal::Decimal;
use million_shared::types::LedgerAccountId;

use super::error::LedgerError;
use super::line::LedgerLine;
use super::types::{CashDirection, EntryKind};
use super::validation::{validate_amount, validate_lines};

/// Name of the per-currency cash account every user gets on first use.
pub const CASH_ACCOUNT_NAME: &str = "Cash";

/// Name of the clearing account that mirrors money entering or leaving the ledger.
pub const CLEARING_ACCOUNT_NAME: &str = "External Cash";

/// A validated entry ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingPlan {
    /// Entry kind.
    pub kind: EntryKind,
    /// Entry description.
    pub description: String,
    /// Balanced lines.
    pub lines: Vec<LedgerLine>,
}

/// Builds the entry for a cash movement.
///
/// The cash account takes the direction's side, the clearing account the
/// opposite side, both for the same amount.
///
/// # Errors
///
/// Returns `LedgerError::NonPositiveAmount` if `amount <= 0` and
/// `LedgerError::AmountTooLarge` above `MAX_LINE_AMOUNT`.
pub fn plan_cash_posting(
    direction: CashDirection,
    amount: Decimal,
    cash_account: LedgerAccountId,
    clearing_account: LedgerAccountId,
    note: Option<&str>,
) -> Result<PostingPlan, LedgerError> {
    let amount = validate_amount(amount)?;

    let memo = note
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(ToString::to_string);

    let (cash_line, clearing_line) = match direction {
        CashDirection::Deposit => (
            LedgerLine::debit(cash_account, amount),
            LedgerLine::credit(clearing_account, amount),
        ),
        CashDirection::Withdraw => (
            LedgerLine::credit(cash_account, amount),
            LedgerLine::debit(clearing_account, amount),
        ),
    };
    let lines = vec![cash_line.with_memo(memo.clone()), clearing_line.with_memo(memo.clone())];

    validate_lines(&lines)?;

    let description = match (direction, memo) {
        (CashDirection::Deposit, Some(m)) => format!("Cash deposit: {m}"),
        (CashDirection::Withdraw, Some(m)) => format!("Cash withdrawal: {m}"),
        (CashDirection::Deposit, None) => "Cash deposit".to_string(),
        (CashDirection::Withdraw, None) => "Cash withdrawal".to_string(),
    };

    Ok(PostingPlan {
        kind: direction.entry_kind(),
        description,
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::Side;
    use crate::ledger::validation::MAX_LINE_AMOUNT;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deposit_debits_cash() {
        let cash = LedgerAccountId::new();
        let clearing = LedgerAccountId::new();

        let plan =
            plan_cash_posting(CashDirection::Deposit, dec!(500), cash, clearing, None).unwrap();

        assert_eq!(plan.kind, EntryKind::CashDeposit);
        assert_eq!(plan.description, "Cash deposit");
        assert_eq!(plan.lines.len(), 2);
        assert_eq!(plan.lines[0].account_id, cash);
        assert_eq!(plan.lines[0].side, Side::Debit);
        assert_eq!(plan.lines[1].account_id, clearing);
        assert_eq!(plan.lines[1].side, Side::Credit);
        assert_eq!(plan.lines[0].amount, plan.lines[1].amount);
    }

    #[test]
    fn test_withdraw_credits_cash() {
        let cash = LedgerAccountId::new();
        let clearing = LedgerAccountId::new();

        let plan = plan_cash_posting(
            CashDirection::Withdraw,
            dec!(40),
            cash,
            clearing,
            Some(" atm "),
        )
        .unwrap();

        assert_eq!(plan.kind, EntryKind::CashWithdraw);
        assert_eq!(plan.description, "Cash withdrawal: atm");
        assert_eq!(plan.lines[0].side, Side::Credit);
        assert_eq!(plan.lines[1].side, Side::Debit);
        assert_eq!(plan.lines[0].memo.as_deref(), Some("atm"));
    }

    #[test]
    fn test_rejects_non_positive() {
        let cash = LedgerAccountId::new();
        let clearing = LedgerAccountId::new();

        for amount in [dec!(0), dec!(-5)] {
            assert!(matches!(
                plan_cash_posting(CashDirection::Deposit, amount, cash, clearing, None),
                Err(LedgerError::NonPositiveAmount(_))
            ));
        }
    }

    #[test]
    fn test_rejects_amount_above_ceiling() {
        let cash = LedgerAccountId::new();
        let clearing = LedgerAccountId::new();

        assert!(
            plan_cash_posting(CashDirection::Deposit, MAX_LINE_AMOUNT, cash, clearing, None).is_ok()
        );
        assert!(matches!(
            plan_cash_posting(
                CashDirection::Deposit,
                dec!(50_000_000_000_000_000_000_000_000_000),
                cash,
                clearing,
                None
            ),
            Err(LedgerError::AmountTooLarge { .. })
        ));
    }
}
