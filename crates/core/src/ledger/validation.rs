//! Business rule validation for ledger entries.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::line::LedgerLine;
use super::types::{Side, TransactionTotals};

/// Largest amount a single line may carry, ten to the fifteenth.
pub const MAX_LINE_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Checks one amount against the positive range `(0, MAX_LINE_AMOUNT]`.
///
/// # Errors
///
/// Returns `LedgerError::NonPositiveAmount` or `LedgerError::AmountTooLarge`.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveAmount(amount));
    }
    if amount > MAX_LINE_AMOUNT {
        return Err(LedgerError::AmountTooLarge {
            amount,
            max: MAX_LINE_AMOUNT,
        });
    }
    Ok(amount)
}

/// Validates that a set of lines forms a balanced double-entry.
///
/// Every amount must be positive and within `MAX_LINE_AMOUNT`, both sides
/// must be present and debits must equal credits.
///
/// # Errors
///
/// Returns the first rule the lines violate.
pub fn validate_lines(lines: &[LedgerLine]) -> Result<TransactionTotals, LedgerError> {
    if lines.is_empty() {
        return Err(LedgerError::NoLines);
    }

    let mut debit = Decimal::ZERO;
    let mut credit = Decimal::ZERO;

    for line in lines {
        let amount = validate_amount(line.amount)?;
        let total = match line.side {
            Side::Debit => &mut debit,
            Side::Credit => &mut credit,
        };
        *total = total.checked_add(amount).ok_or(LedgerError::Overflow)?;
    }

    if debit.is_zero() || credit.is_zero() {
        return Err(LedgerError::SingleSided);
    }

    let totals = TransactionTotals::new(debit, credit);
    if !totals.is_balanced() {
        return Err(LedgerError::Unbalanced { debit, credit });
    }

    Ok(totals)
}
