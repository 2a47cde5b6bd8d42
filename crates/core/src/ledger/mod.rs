//! Double-entry journal logic.
//!
//! This module implements the rules of the posting engine:
//! - Journal and line types
//! - Line validation and balance checks
//! - Storage ordering of lines
//! - Reference numbering
//! - Error types for every ledger operation

pub mod error;
pub mod reference;
pub mod service;
pub mod types;

#[cfg(test)]
mod validation_props;

pub use error::LedgerError;
pub use reference::{format_reference, month_prefix, next_reference, parse_sequence};
pub use service::PostingService;
pub use types::{EntrySide, JournalKind, JournalLineInput, JournalTotals, PostJournalInput};
