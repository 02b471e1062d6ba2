//! Realized profit and loss.

use rust_decimal::Decimal;

use super::error::TradingError;
use super::types::TradeAction;

/// Realized P&L of closing a position.
///
/// Long: `(exit - entry) * qty`. Short: `(entry - exit) * qty`.
///
/// # Errors
///
/// Returns `TradingError::Overflow` if the result leaves the decimal range.
pub fn realized_pnl(
    action: TradeAction,
    entry_price: Decimal,
    exit_price: Decimal,
    quantity: i64,
) -> Result<Decimal, TradingError> {
    let qty = Decimal::from(quantity);
    let per_unit = match action {
        TradeAction::Buy => exit_price.checked_sub(entry_price),
        TradeAction::Sell => entry_price.checked_sub(exit_price),
    };
    per_unit
        .and_then(|diff| diff.checked_mul(qty))
        .ok_or(TradingError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_long_profit() {
        assert_eq!(realized_pnl(TradeAction::Buy, dec!(100), dec!(110), 10), Ok(dec!(100)));
    }

    #[test]
    fn test_long_loss() {
        assert_eq!(realized_pnl(TradeAction::Buy, dec!(100), dec!(95.5), 2), Ok(dec!(-9.0)));
    }

    #[test]
    fn test_short_profit() {
        assert_eq!(realized_pnl(TradeAction::Sell, dec!(200), dec!(150), 2), Ok(dec!(100)));
    }

    #[test]
    fn test_extreme_inputs_overflow() {
        assert_eq!(
            realized_pnl(TradeAction::Sell, Decimal::MAX, dec!(-1), 1),
            Err(TradingError::Overflow)
        );
        assert_eq!(
            realized_pnl(TradeAction::Buy, dec!(0), Decimal::MAX, 2),
            Err(TradingError::Overflow)
        );
    }

    #[test]
    fn test_capped_inputs_stay_in_range() {
        let pnl = realized_pnl(
            TradeAction::Buy,
            dec!(0.01),
            crate::trading::MAX_PRICE,
            crate::trading::MAX_QUANTITY,
        );
        assert!(pnl.is_ok());
    }
}
