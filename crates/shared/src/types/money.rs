//! Currency codes.
//!
//! CRITICAL: Never use floating-point for money calculations. Amounts are
//! `rust_decimal::Decimal` everywhere; this module only normalises the
//! currency a ledger account is denominated in.

use serde::{Deserialize, Serialize};

/// Currency used when a request does not name one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// An upper-cased, three-letter currency code such as `USD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses a currency code, trimming and upper-casing it.
    ///
    /// # Errors
    ///
    /// Returns a message when the code is not three ASCII letters.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let code = raw.trim().to_ascii_uppercase();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code))
        } else {
            Err(format!("invalid currency code: {raw:?}"))
        }
    }

    /// Parses an optional code, falling back to [`DEFAULT_CURRENCY`] when absent or blank.
    ///
    /// # Errors
    ///
    /// Returns a message when a non-blank code is malformed.
    pub fn parse_or_default(raw: Option<&str>) -> Result<Self, String> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(code) => Self::parse(code),
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self(DEFAULT_CURRENCY.to_string())
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("USD", "USD")]
    #[case("usd", "USD")]
    #[case(" eur ", "EUR")]
    fn test_parse_normalises(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(CurrencyCode::parse(raw).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("US")]
    #[case("USDT")]
    #[case("U$D")]
    fn test_parse_rejects(#[case] raw: &str) {
        assert!(CurrencyCode::parse(raw).is_err());
    }

    #[test]
    fn test_default_currency() {
        assert_eq!(CurrencyCode::parse_or_default(None).unwrap().as_str(), "USD");
        assert_eq!(CurrencyCode::parse_or_default(Some("  ")).unwrap().as_str(), "USD");
        assert_eq!(CurrencyCode::parse_or_default(Some("jpy")).unwrap().as_str(), "JPY");
    }

    #[test]
    fn test_deserialize_validates() {
        let code: CurrencyCode = serde_json::from_str("\"idr\"").unwrap();
        assert_eq!(code.to_string(), "IDR");
        assert!(serde_json::from_str::<CurrencyCode>("\"idrx\"").is_err());
    }
}
