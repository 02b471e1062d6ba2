//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{CurrencyCode, DEFAULT_CURRENCY};
pub use pagination::LimitQuery;
