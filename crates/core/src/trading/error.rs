//! Trading error types.

use thiserror::Error;

use million_shared::AppError;

use super::types::OrderStatus;

/// Errors raised by trade, order and holding rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TradingError {
    /// Symbol is blank.
    #[error("Symbol is required")]
    EmptySymbol,

    /// Quantity must be positive.
    #[error("Quantity must be positive")]
    NonPositiveQuantity,

    /// Quantity is above the ceiling.
    #[error("Quantity must not exceed {}", super::MAX_QUANTITY)]
    QuantityTooLarge,

    /// Price must be positive.
    #[error("{0} must be positive")]
    NonPositivePrice(&'static str),

    /// Price is above the ceiling.
    #[error("{0} must not exceed {max}", max = super::MAX_PRICE)]
    PriceTooLarge(&'static str),

    /// P&L or holding arithmetic left the decimal range.
    #[error("Result is out of range")]
    Overflow,

    /// Action could not be recognised.
    #[error("Unknown action: {0:?}")]
    UnknownAction(String),

    /// Instrument could not be recognised.
    #[error("Unknown instrument: {0:?}")]
    UnknownInstrument(String),

    /// Option type could not be recognised.
    #[error("Unknown option type: {0:?}")]
    UnknownOptionType(String),

    /// Trade is already closed.
    #[error("Trade is already closed")]
    AlreadyClosed,

    /// Order cannot move to the requested status.
    #[error("Order is {from}, cannot become {to}")]
    InvalidTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },
}

impl From<TradingError> for AppError {
    fn from(err: TradingError) -> Self {
        match err {
            TradingError::AlreadyClosed | TradingError::InvalidTransition { .. } => {
                Self::Conflict(err.to_string())
            }
            TradingError::Overflow => Self::BusinessRule(err.to_string()),
            TradingError::EmptySymbol
            | TradingError::NonPositiveQuantity
            | TradingError::QuantityTooLarge
            | TradingError::NonPositivePrice(_)
            | TradingError::PriceTooLarge(_)
            | TradingError::UnknownAction(_)
            | TradingError::UnknownInstrument(_)
            | TradingError::UnknownOptionType(_) => Self::Validation(err.to_string()),
        }
    }
}
