//! Trading enums and lenient input parsing.

use serde::{Deserialize, Serialize};

use super::error::TradingError;

fn first_upper(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Traded instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    /// Shares.
    Stock,
    /// Option contracts.
    Option,
}

impl Instrument {
    /// Parses `"Stock"`, `"STOCK"`, `"option"`, `"opt"`. Blank means stock.
    ///
    /// # Errors
    ///
    /// Returns `TradingError::UnknownInstrument` for anything else.
    pub fn parse(raw: Option<&str>) -> Result<Self, TradingError> {
        let value = first_upper(raw.unwrap_or_default());
        if value.is_empty() || value.starts_with("ST") || value == "EQUITY" {
            Ok(Self::Stock)
        } else if value.starts_with("OPT") {
            Ok(Self::Option)
        } else {
            Err(TradingError::UnknownInstrument(value))
        }
    }
}

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    /// Long.
    Buy,
    /// Short.
    Sell,
}

impl TradeAction {
    /// Parses `"Buy"`, `"BUY"`, `"b"`, `"sell"`, `"S"`. Blank means buy.
    ///
    /// # Errors
    ///
    /// Returns `TradingError::UnknownAction` for anything else.
    pub fn parse(raw: Option<&str>) -> Result<Self, TradingError> {
        let value = first_upper(raw.unwrap_or_default());
        match value.chars().next() {
            None | Some('B') => Ok(Self::Buy),
            Some('S') => Ok(Self::Sell),
            _ => Err(TradingError::UnknownAction(value)),
        }
    }
}

/// Option right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Call.
    Call,
    /// Put.
    Put,
}

impl OptionType {
    /// Parses `"Call"`/`"C"`/`"put"`/`"P"`; blank means none.
    ///
    /// # Errors
    ///
    /// Returns `TradingError::UnknownOptionType` for anything else.
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, TradingError> {
        let value = first_upper(raw.unwrap_or_default());
        match value.chars().next() {
            None => Ok(None),
            Some('C') => Ok(Some(Self::Call)),
            Some('P') => Ok(Some(Self::Put)),
            _ => Err(TradingError::UnknownOptionType(value)),
        }
    }
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Waiting for a fill or cancellation.
    Pending,
    /// Filled, has a trade.
    Filled,
    /// Cancelled.
    Cancelled,
}

impl OrderStatus {
    /// Returns true for statuses that accept no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled)
    }

    /// Validates a transition.
    ///
    /// # Errors
    ///
    /// Returns `TradingError::InvalidTransition` unless moving out of `Pending`
    /// into a terminal status.
    pub fn transition(self, to: Self) -> Result<Self, TradingError> {
        if self == Self::Pending && to.is_terminal() {
            Ok(to)
        } else {
            Err(TradingError::InvalidTransition { from: self, to })
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Filled => "filled",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Order lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderEventKind {
    /// Order recorded.
    Created,
    /// Order cancelled.
    Cancelled,
    /// Order filled.
    Filled,
}

impl From<OrderStatus> for OrderEventKind {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Pending => Self::Created,
            OrderStatus::Filled => Self::Filled,
            OrderStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Upper-cases and trims a ticker symbol.
///
/// # Errors
///
/// Returns `TradingError::EmptySymbol` if nothing is left.
pub fn normalize_symbol(raw: &str) -> Result<String, TradingError> {
    let symbol = raw.trim().to_ascii_uppercase();
    if symbol.is_empty() {
        Err(TradingError::EmptySymbol)
    } else {
        Ok(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, TradeAction::Buy)]
    #[case(Some("Buy"), TradeAction::Buy)]
    #[case(Some("BUY"), TradeAction::Buy)]
    #[case(Some("b"), TradeAction::Buy)]
    #[case(Some("sell"), TradeAction::Sell)]
    #[case(Some(" Sell "), TradeAction::Sell)]
    fn test_action_parse(#[case] raw: Option<&str>, #[case] expected: TradeAction) {
        assert_eq!(TradeAction::parse(raw).unwrap(), expected);
    }

    #[rstest]
    #[case(None, Instrument::Stock)]
    #[case(Some("Stock"), Instrument::Stock)]
    #[case(Some("STOCK"), Instrument::Stock)]
    #[case(Some("option"), Instrument::Option)]
    #[case(Some("Options"), Instrument::Option)]
    fn test_instrument_parse(#[case] raw: Option<&str>, #[case] expected: Instrument) {
        assert_eq!(Instrument::parse(raw).unwrap(), expected);
    }

    #[test]
    fn test_unknown_values_rejected() {
        assert!(TradeAction::parse(Some("hold")).is_err());
        assert!(Instrument::parse(Some("future")).is_err());
        assert!(OptionType::parse(Some("straddle")).is_err());
        assert_eq!(OptionType::parse(Some("call")).unwrap(), Some(OptionType::Call));
        assert_eq!(OptionType::parse(None).unwrap(), None);
    }

    #[test]
    fn test_order_transitions() {
        assert_eq!(
            OrderStatus::Pending.transition(OrderStatus::Filled),
            Ok(OrderStatus::Filled)
        );
        assert_eq!(
            OrderStatus::Pending.transition(OrderStatus::Cancelled),
            Ok(OrderStatus::Cancelled)
        );
        assert!(OrderStatus::Filled.transition(OrderStatus::Cancelled).is_err());
        assert!(OrderStatus::Cancelled.transition(OrderStatus::Filled).is_err());
        assert!(OrderStatus::Pending.transition(OrderStatus::Pending).is_err());
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_symbol(""), Err(TradingError::EmptySymbol));
    }
}
