//! Ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use million_shared::AppError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// An entry needs at least one line.
    #[error("Entry must have at least one line")]
    NoLines,

    /// Entry has only one side (all debits or all credits).
    #[error("Entry must have both debit and credit lines")]
    SingleSided,

    /// Line amount is zero or negative.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Line amount is above the per-line ceiling.
    #[error("Amount must not exceed {max}, got {amount}")]
    AmountTooLarge {
        /// Requested amount.
        amount: Decimal,
        /// Ceiling.
        max: Decimal,
    },

    /// Entry is not balanced (debits != credits).
    #[error("Entry is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Cash direction could not be recognised.
    #[error("Unknown cash direction: {0:?}")]
    UnknownDirection(String),

    /// Currency code is malformed.
    #[error("{0}")]
    InvalidCurrency(String),

    // ========== Account Errors ==========
    /// Ledger account not found (or owned by someone else).
    #[error("Ledger account not found: {0}")]
    AccountNotFound(Uuid),

    /// Ledger account is denominated in another currency.
    #[error("Ledger account {account_id} is in {account_currency}, not {requested}")]
    CurrencyMismatch {
        /// The account.
        account_id: Uuid,
        /// The account's currency.
        account_currency: String,
        /// The requested currency.
        requested: String,
    },

    /// A debit or credit total left the representable decimal range.
    #[error("Ledger total is out of range")]
    Overflow,

    // ========== Persistence Errors ==========
    /// The atomic write failed and was rolled back.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AccountNotFound(_) => Self::NotFound(err.to_string()),
            LedgerError::Database(msg) => Self::Database(msg),
            LedgerError::Overflow => Self::BusinessRule(err.to_string()),
            LedgerError::NoLines
            | LedgerError::SingleSided
            | LedgerError::NonPositiveAmount(_)
            | LedgerError::AmountTooLarge { .. }
            | LedgerError::Unbalanced { .. }
            | LedgerError::UnknownDirection(_)
            | LedgerError::InvalidCurrency(_)
            | LedgerError::CurrencyMismatch { .. } => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_maps_to_app_error() {
        let err: AppError = LedgerError::NonPositiveAmount(dec!(0)).into();
        assert_eq!(err.status_code(), 400);

        let err: AppError = LedgerError::AccountNotFound(Uuid::nil()).into();
        assert_eq!(err.status_code(), 404);

        let err: AppError = LedgerError::Database("disk full".into()).into();
        assert_eq!(err.status_code(), 500);

        let err: AppError = LedgerError::AmountTooLarge {
            amount: dec!(10_000_000_000_000_000),
            max: dec!(1_000_000_000_000_000),
        }
        .into();
        assert_eq!(err.status_code(), 400);

        let err: AppError = LedgerError::Overflow.into();
        assert_eq!(err.status_code(), 422);
    }
}
