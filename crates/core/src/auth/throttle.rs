//! Login throttling rule.
//!
//! Failed login attempts are stored as auth events. The rule here decides,
//! from the number of failures inside the window, whether another attempt
//! may proceed.

use chrono::{DateTime, Duration, Utc};

/// Sliding-window login throttle for one username+ip pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginThrottle {
    /// Window length in seconds.
    pub window_secs: i64,
    /// Failures allowed inside the window.
    pub max_failures: u64,
}

impl Default for LoginThrottle {
    fn default() -> Self {
        Self {
            window_secs: 300,
            max_failures: 5,
        }
    }
}

impl LoginThrottle {
    /// Creates a throttle.
    #[must_use]
    pub const fn new(window_secs: i64, max_failures: u64) -> Self {
        Self {
            window_secs,
            max_failures,
        }
    }

    /// Oldest failure timestamp that still counts.
    #[must_use]
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::seconds(self.window_secs)
    }

    /// Returns true once `recent_failures` reaches the limit.
    #[must_use]
    pub const fn is_limited(&self, recent_failures: u64) -> bool {
        self.max_failures > 0 && recent_failures >= self.max_failures
    }
}
