//! Entity aliases.

pub use super::accounts::Entity as Accounts;
pub use super::auth_events::Entity as AuthEvents;
pub use super::auth_sessions::Entity as AuthSessions;
pub use super::budget_entries::Entity as BudgetEntries;
pub use super::holdings::Entity as Holdings;
pub use super::ledger_accounts::Entity as LedgerAccounts;
pub use super::ledger_entries::Entity as LedgerEntries;
pub use super::ledger_lines::Entity as LedgerLines;
pub use super::order_events::Entity as OrderEvents;
pub use super::orders::Entity as Orders;
pub use super::refresh_tokens::Entity as RefreshTokens;
pub use super::trades::Entity as Trades;
pub use super::users::Entity as Users;
