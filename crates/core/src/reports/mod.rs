//! Financial report generation.
//!
//! This module provides pure business logic for building reports from
//! persisted journal lines:
//! - Account activity over a date range
//! - Trial Balance
//! - Balance Sheet
//! - Income Statement
//! - General Ledger

pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use service::ReportService;
pub use types::*;
