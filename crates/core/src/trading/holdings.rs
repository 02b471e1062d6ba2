//! Position bookkeeping for holdings that follow trades.

use rust_decimal::Decimal;

use super::error::TradingError;
use super::types::TradeAction;

/// Quantity and average cost of one symbol in one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Signed quantity; negative is short.
    pub quantity: Decimal,
    /// Average cost of the open quantity.
    pub avg_cost: Option<Decimal>,
}

/// Signed quantity change of opening a trade.
#[must_use]
pub fn opening_delta(action: TradeAction, quantity: i64) -> Decimal {
    let qty = Decimal::from(quantity);
    match action {
        TradeAction::Buy => qty,
        TradeAction::Sell => -qty,
    }
}

/// Applies a quantity change at `price` to an existing position.
///
/// Adding in the same direction re-weights the average cost. Reducing keeps
/// it. Crossing through zero starts a fresh average at `price`. Returns
/// `None` when the position is flat.
///
/// # Errors
///
/// Returns `TradingError::Overflow` if the quantity or weighted cost leaves
/// the decimal range.
pub fn apply_delta(
    current: Option<Position>,
    delta: Decimal,
    price: Option<Decimal>,
) -> Result<Option<Position>, TradingError> {
    let (old_qty, old_cost) = current.map_or((Decimal::ZERO, None), |p| (p.quantity, p.avg_cost));
    let new_qty = old_qty.checked_add(delta).ok_or(TradingError::Overflow)?;

    if new_qty.is_zero() {
        return Ok(None);
    }

    let same_direction = old_qty.is_zero() || old_qty.is_sign_positive() == delta.is_sign_positive();
    let crossed = !old_qty.is_zero() && old_qty.is_sign_positive() != new_qty.is_sign_positive();

    let avg_cost = if crossed {
        price
    } else if same_direction {
        match (old_cost, price) {
            (Some(cost), Some(px)) if !old_qty.is_zero() => {
                Some(weighted_cost(cost, old_qty.abs(), px, delta.abs(), new_qty.abs())?)
            }
            (_, Some(px)) if old_qty.is_zero() => Some(px),
            (cost, _) => cost,
        }
    } else {
        old_cost
    };

    Ok(Some(Position {
        quantity: new_qty,
        avg_cost,
    }))
}

fn weighted_cost(
    cost: Decimal,
    held: Decimal,
    price: Decimal,
    added: Decimal,
    total: Decimal,
) -> Result<Decimal, TradingError> {
    cost.checked_mul(held)
        .zip(price.checked_mul(added))
        .and_then(|(a, b)| a.checked_add(b))
        .and_then(|sum| sum.checked_div(total))
        .ok_or(TradingError::Overflow)
}
