//! Trade journal rules: enums, P&L, holdings sync and order lifecycle.

pub mod error;
pub mod holdings;
pub mod pnl;
pub mod types;

pub use error::TradingError;
pub use holdings::{Position, apply_delta, opening_delta};
pub use pnl::realized_pnl;
pub use types::{
    Instrument, OptionType, OrderEventKind, OrderStatus, TradeAction, normalize_symbol,
};

use rust_decimal::Decimal;

/// Largest quantity a trade or order may carry.
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// Largest price a trade or order may carry, ten to the twelfth.
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Checks a trade or order quantity.
///
/// # Errors
///
/// Returns `TradingError::NonPositiveQuantity` when `quantity <= 0` and
/// `TradingError::QuantityTooLarge` above `MAX_QUANTITY`.
pub const fn validate_quantity(quantity: i64) -> Result<i64, TradingError> {
    if quantity <= 0 {
        Err(TradingError::NonPositiveQuantity)
    } else if quantity > MAX_QUANTITY {
        Err(TradingError::QuantityTooLarge)
    } else {
        Ok(quantity)
    }
}

/// Checks a manually entered holding quantity. Shorts are negative.
///
/// # Errors
///
/// Returns `TradingError::QuantityTooLarge` when `|quantity| > MAX_QUANTITY`.
pub fn validate_holding_quantity(quantity: Decimal) -> Result<Decimal, TradingError> {
    if quantity.abs() > Decimal::from(MAX_QUANTITY) {
        Err(TradingError::QuantityTooLarge)
    } else {
        Ok(quantity)
    }
}

/// Checks a price field.
///
/// # Errors
///
/// Returns `TradingError::NonPositivePrice` naming `field` when `price <= 0`
/// and `TradingError::PriceTooLarge` above `MAX_PRICE`.
pub fn validate_price(field: &'static str, price: Decimal) -> Result<Decimal, TradingError> {
    if price <= Decimal::ZERO {
        Err(TradingError::NonPositivePrice(field))
    } else if price > MAX_PRICE {
        Err(TradingError::PriceTooLarge(field))
    } else {
        Ok(price)
    }
}
