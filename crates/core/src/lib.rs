//! Core business logic for Million.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Double-entry bookkeeping: line validation, cash postings, balances
//! - `auth` - Password hashing and policy, login throttle, auth event kinds
//! - `trading` - Trades, orders and holdings rules
//! - `budget` - Budget entry kinds and validation

pub mod auth;
pub mod budget;
pub mod ledger;
pub mod trading;
