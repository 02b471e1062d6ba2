//! Budget journal entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What a budget line tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetKind {
    /// Money spent.
    Expense,
    /// Money earned.
    Income,
    /// Money set aside as an asset.
    Asset,
}

impl BudgetKind {
    /// Parses loosely formatted input. Blank means expense.
    ///
    /// Matches on substrings so `"Incomes"`, `"INCOME"` and `"income"` agree.
    ///
    /// # Errors
    ///
    /// Returns a message for unrecognised kinds.
    pub fn parse(raw: Option<&str>) -> Result<Self, String> {
        let value = raw.unwrap_or_default().trim().to_ascii_uppercase();
        if value.is_empty() || value.contains("EXPENS") {
            Ok(Self::Expense)
        } else if value.contains("INCOM") {
            Ok(Self::Income)
        } else if value.contains("ASSET") {
            Ok(Self::Asset)
        } else {
            Err(format!("Unknown budget type: {value:?}"))
        }
    }
}

/// Validates a budget line's category and amount.
///
/// # Errors
///
/// Returns a message when the category is blank or the amount is not positive.
pub fn validate_budget_line(category: &str, amount: Decimal) -> Result<String, String> {
    let category = category.trim();
    if category.is_empty() {
        return Err("Category is required".to_string());
    }
    if amount <= Decimal::ZERO {
        return Err("Amount must be positive".to_string());
    }
    Ok(category.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(None, BudgetKind::Expense)]
    #[case(Some("Expense"), BudgetKind::Expense)]
    #[case(Some("INCOME"), BudgetKind::Income)]
    #[case(Some("incomes"), BudgetKind::Income)]
    #[case(Some("Asset"), BudgetKind::Asset)]
    fn test_kind_parse(#[case] raw: Option<&str>, #[case] expected: BudgetKind) {
        assert_eq!(BudgetKind::parse(raw).unwrap(), expected);
    }

    #[test]
    fn test_kind_unknown() {
        assert!(BudgetKind::parse(Some("transfer")).is_err());
    }

    #[test]
    fn test_validate_line() {
        assert_eq!(validate_budget_line(" Rent ", dec!(1200)).unwrap(), "Rent");
        assert!(validate_budget_line("", dec!(10)).is_err());
        assert!(validate_budget_line("Food", dec!(0)).is_err());
    }
}
