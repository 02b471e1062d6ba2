//! String-backed enums stored by the entities.
//!
//! Each mirrors a `million_core` enum; the `From` impls keep the two in step.

use sea_orm::entity::prelude::*;

use million_core::{
    budget::BudgetKind,
    ledger::{EntryKind, LedgerAccountKind, Side},
    trading::{Instrument, OptionType, OrderEventKind, OrderStatus, TradeAction},
};

/// Debit or credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum LineSide {
    /// Debit.
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Credit.
    #[sea_orm(string_value = "credit")]
    Credit,
}

/// Ledger account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AccountKind {
    /// Asset.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Liability.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Equity.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Income.
    #[sea_orm(string_value = "income")]
    Income,
    /// Expense.
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// Ledger entry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum LedgerEntryType {
    /// Cash paid in.
    #[sea_orm(string_value = "cash_deposit")]
    CashDeposit,
    /// Cash paid out.
    #[sea_orm(string_value = "cash_withdraw")]
    CashWithdraw,
}

/// Stock or option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum InstrumentType {
    /// Stock.
    #[sea_orm(string_value = "stock")]
    Stock,
    /// Option contract.
    #[sea_orm(string_value = "option")]
    Option,
}

/// Buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum ActionType {
    /// Buy.
    #[sea_orm(string_value = "buy")]
    Buy,
    /// Sell.
    #[sea_orm(string_value = "sell")]
    Sell,
}

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum OptionRight {
    /// Call.
    #[sea_orm(string_value = "call")]
    Call,
    /// Put.
    #[sea_orm(string_value = "put")]
    Put,
}

/// Order lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum OrderState {
    /// Waiting for a fill.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Filled.
    #[sea_orm(string_value = "filled")]
    Filled,
    /// Cancelled.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Order audit event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum OrderEventType {
    /// Order created.
    #[sea_orm(string_value = "created")]
    Created,
    /// Order cancelled.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Order filled.
    #[sea_orm(string_value = "filled")]
    Filled,
}

/// Budget line kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum BudgetType {
    /// Expense.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Income.
    #[sea_orm(string_value = "income")]
    Income,
    /// Asset.
    #[sea_orm(string_value = "asset")]
    Asset,
}

macro_rules! mirror {
    ($db:ident <=> $core:ident { $($variant:ident),+ $(,)? }) => {
        impl From<$core> for $db {
            fn from(value: $core) -> Self {
                match value {
                    $($core::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$db> for $core {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror!(LineSide <=> Side { Debit, Credit });
mirror!(AccountKind <=> LedgerAccountKind { Asset, Liability, Equity, Income, Expense });
mirror!(LedgerEntryType <=> EntryKind { CashDeposit, CashWithdraw });
mirror!(InstrumentType <=> Instrument { Stock, Option });
mirror!(ActionType <=> TradeAction { Buy, Sell });
mirror!(OptionRight <=> OptionType { Call, Put });
mirror!(OrderState <=> OrderStatus { Pending, Filled, Cancelled });
mirror!(OrderEventType <=> OrderEventKind { Created, Cancelled, Filled });
mirror!(BudgetType <=> BudgetKind { Expense, Income, Asset });
