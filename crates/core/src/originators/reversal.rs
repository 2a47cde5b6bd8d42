//! Reversal of posted journals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::{JournalKind, JournalLineInput, LedgerError, PostingService};

/// Request to reverse a journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReverseJournalInput {
    /// Journal to reverse.
    pub journal_id: Uuid,
    /// Date of the reversing journal.
    pub reversal_date: NaiveDate,
    /// Why the journal is reversed.
    pub reason: String,
}

/// Checks that a journal of `kind` may be reversed on its own.
///
/// # Errors
///
/// Returns `LedgerError::Validation` for kinds whose side effects are undone
/// by their originator.
pub fn ensure_reversible(kind: JournalKind, journal_id: Uuid) -> Result<(), LedgerError> {
    if kind.is_directly_reversible() {
        Ok(())
    } else {
        Err(LedgerError::Validation(format!(
            "{kind} journal {journal_id} cannot be reversed directly"
        )))
    }
}

/// Builds reversing lines: each original line on the opposite side.
#[must_use]
pub fn build_reversal_lines(original: &[JournalLineInput]) -> Vec<JournalLineInput> {
    PostingService::order_lines(original.iter().map(JournalLineInput::swapped).collect())
}
