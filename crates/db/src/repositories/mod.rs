//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod auth_event;
pub mod budget;
pub mod error;
pub mod ledger;
pub mod order;
pub mod session;
pub mod trade;
pub mod user;

pub use account::{
    AccountRepository, CreateAccountInput, DEFAULT_TRADING_ACCOUNT, UpsertHoldingInput,
};
pub use auth_event::{AuthEventRepository, NewAuthEvent};
pub use budget::{BudgetRepository, NewBudgetEntry};
pub use error::JournalError;
pub use ledger::{
    AccountWithBalance, CashMovement, CashPosting, EntryLineRow, LedgerRepository, PostedEntry,
};
pub use order::{NewOrder, OrderRepository};
pub use session::{ClientInfo, IssuedSession, REUSE_REASON, SessionError, SessionRepository};
pub use trade::{NewTrade, TradeRepository, TradeUpdate};
pub use user::UserRepository;
