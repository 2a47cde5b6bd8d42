//! Planning of bank-statement reconciliation batches.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::LedgerError;

/// Reconciliation state of a stored journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineReconState {
    /// Line ID.
    pub line_id: Uuid,
    /// Whether the line is already reconciled.
    pub reconciled: bool,
}

/// What a reconciliation batch will do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationPlan {
    /// Lines to mark reconciled, in request order.
    pub to_mark: Vec<Uuid>,
    /// Lines that were already reconciled and are left untouched.
    pub already_reconciled: Vec<Uuid>,
}

impl ReconciliationPlan {
    /// Returns true when the batch changes nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.to_mark.is_empty()
    }
}

/// Plans a batch from the requested ids and the lines found for them.
///
/// Duplicate ids in the request count once.
///
/// # Errors
///
/// Returns `Validation` for an empty request and `NotFound` for the first
/// requested id with no stored line; the batch is then rejected whole.
pub fn plan_reconciliation(
    requested: &[Uuid],
    found: &[LineReconState],
) -> Result<ReconciliationPlan, LedgerError> {
    if requested.is_empty() {
        return Err(LedgerError::Validation(
            "at least one journal line is required".to_string(),
        ));
    }

    let states: HashMap<Uuid, bool> = found.iter().map(|s| (s.line_id, s.reconciled)).collect();
    let mut seen = HashSet::with_capacity(requested.len());
    let mut plan = ReconciliationPlan::default();

    for id in requested {
        if !seen.insert(*id) {
            continue;
        }
        match states.get(id) {
            None => {
                return Err(LedgerError::NotFound {
                    entity: "journal_line",
                    id: *id,
                });
            }
            Some(true) => plan.already_reconciled.push(*id),
            Some(false) => plan.to_mark.push(*id),
        }
    }

    Ok(plan)
}
