//! Core business logic for Bursar.
//!
//! This crate contains pure business logic with no database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `accounts` - Chart of accounts, role tags, registration rules
//! - `ledger` - Double-entry journal validation and references
//! - `originators` - Journal lines for invoices, payments, deposits, reversals
//! - `inventory` - Stock movement arithmetic
//! - `reconciliation` - Settlement status, bank reconciliation, cache audits
//! - `reports` - Trial balance, balance sheet, income statement, general ledger
//! - `context` - Actor and branch stamped on every write

pub mod accounts;
pub mod context;
pub mod inventory;
pub mod ledger;
pub mod originators;
pub mod reconciliation;
pub mod reports;

pub use context::ActorContext;
pub use ledger::LedgerError;
