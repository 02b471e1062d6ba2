//! Limit parameters for list endpoints.

use serde::Deserialize;

/// `?limit=` query parameter, clamped per endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LimitQuery {
    /// Requested number of rows.
    pub limit: Option<u64>,
}

impl LimitQuery {
    /// Returns the requested limit, or `default`, clamped into `1..=max`.
    #[must_use]
    pub fn clamped(self, default: u64, max: u64) -> u64 {
        self.limit.unwrap_or(default).clamp(1, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_defaults_and_clamps() {
        assert_eq!(LimitQuery { limit: None }.clamped(100, 1000), 100);
        assert_eq!(LimitQuery { limit: Some(0) }.clamped(100, 1000), 1);
        assert_eq!(LimitQuery { limit: Some(5) }.clamped(100, 1000), 5);
        assert_eq!(LimitQuery { limit: Some(5000) }.clamped(100, 1000), 1000);
    }
}
