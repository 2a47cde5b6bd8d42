//! Payment and balance reconciliation.
//!
//! - Settlement state of invoices and purchase orders
//! - Planning of bank-statement line reconciliation batches
//! - Consistency checks between cached totals and the ledger

pub mod audit;
pub mod bank;
pub mod settlement;

#[cfg(test)]
mod settlement_props;

pub use audit::{CacheDrift, MovementRecord, check_journal_balance, check_settlement, check_stock_chain};
pub use bank::{LineReconState, ReconciliationPlan, plan_reconciliation};
pub use settlement::{SettlementStatus, SettlementUpdate, apply_payment, remaining, reverse_payment};
