//! Property-based tests for cash postings.
//!
//! Whatever the input, the posting service either refuses or produces an
//! entry whose debits equal its credits.

use proptest::prelude::*;
use rust_decimal::Decimal;
use million_shared::types::LedgerAccountId;

use super::balance::AccountBalance;
use super::error::LedgerError;
use super::posting::plan_cash_posting;
use super::types::{CashDirection, Side};
use super::validation::validate_lines;

fn any_amount() -> impl Strategy<Value = Decimal> {
    (-10_000_000i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn direction() -> impl Strategy<Value = CashDirection> {
    prop_oneof![Just(CashDirection::Deposit), Just(CashDirection::Withdraw)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Postings are balanced, or rejected for a non-positive amount.
    #[test]
    fn prop_posting_never_unbalanced(direction in direction(), amount in any_amount()) {
        let result = plan_cash_posting(
            direction,
            amount,
            LedgerAccountId::new(),
            LedgerAccountId::new(),
            None,
        );

        match result {
            Ok(plan) => {
                prop_assert!(amount > Decimal::ZERO);
                prop_assert_eq!(plan.lines.len(), 2);
                let totals = validate_lines(&plan.lines).expect("plan must validate");
                prop_assert_eq!(totals.debit, amount);
                prop_assert_eq!(totals.credit, amount);
                let signed: Decimal = plan.lines.iter().map(|l| l.signed_amount()).sum();
                prop_assert_eq!(signed, Decimal::ZERO);
            }
            Err(err) => {
                prop_assert!(amount <= Decimal::ZERO);
                prop_assert!(matches!(err, LedgerError::NonPositiveAmount(_)));
            }
        }
    }

    /// A sequence of postings leaves the cash account at deposits minus withdrawals.
    #[test]
    fn prop_cash_balance_tracks_movements(
        moves in prop::collection::vec((direction(), (1i64..1_000_000i64).prop_map(|c| Decimal::new(c, 2))), 0..40)
    ) {
        let cash = LedgerAccountId::new();
        let clearing = LedgerAccountId::new();

        let mut cash_lines = Vec::new();
        let mut clearing_lines = Vec::new();
        let mut expected = Decimal::ZERO;

        for (direction, amount) in &moves {
            let plan = plan_cash_posting(*direction, *amount, cash, clearing, None).expect("positive amount");
            for line in plan.lines {
                if line.account_id == cash {
                    cash_lines.push((line.side, line.amount));
                } else {
                    clearing_lines.push((line.side, line.amount));
                }
            }
            match direction {
                CashDirection::Deposit => expected += *amount,
                CashDirection::Withdraw => expected -= *amount,
            }
        }

        let cash_balance = AccountBalance::from_lines(cash_lines).unwrap().balance();
        let clearing_balance = AccountBalance::from_lines(clearing_lines).unwrap().balance();

        prop_assert_eq!(cash_balance, expected);
        prop_assert_eq!(cash_balance + clearing_balance, Decimal::ZERO);
    }

    /// Random line sets validate only when balanced and two-sided.
    #[test]
    fn prop_validator_rejects_unbalanced(
        lines in prop::collection::vec(
            (prop_oneof![Just(Side::Debit), Just(Side::Credit)], (1i64..10_000i64).prop_map(|c| Decimal::new(c, 2))),
            1..8,
        )
    ) {
        let ledger_lines: Vec<_> = lines
            .iter()
            .map(|(side, amount)| super::line::LedgerLine {
                account_id: LedgerAccountId::new(),
                side: *side,
                amount: *amount,
                memo: None,
            })
            .collect();

        let debit: Decimal = lines.iter().filter(|(s, _)| *s == Side::Debit).map(|(_, a)| *a).sum();
        let credit: Decimal = lines.iter().filter(|(s, _)| *s == Side::Credit).map(|(_, a)| *a).sum();

        let result = validate_lines(&ledger_lines);
        if !debit.is_zero() && debit == credit {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(result.is_err());
        }
    }
}
