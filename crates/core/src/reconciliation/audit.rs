//! Consistency checks between cached totals and the ledger.
//!
//! Paid amounts, settlement status and stock levels are cached on their
//! rows for reads. These checks recompute them from the authoritative
//! records and report every disagreement.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::settlement::SettlementStatus;
use crate::ledger::JournalTotals;

/// One disagreement between a cache and the records it summarises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "drift", rename_all = "snake_case")]
pub enum CacheDrift {
    /// Cached paid amount differs from the sum of completed payments.
    PaidAmount {
        /// `invoice` or `purchase_order`.
        entity: &'static str,
        /// Row ID.
        id: Uuid,
        /// Cached value.
        cached: Decimal,
        /// Value recomputed from payments.
        recomputed: Decimal,
    },
    /// Cached status differs from the one derived from the cached amounts.
    Status {
        /// `invoice` or `purchase_order`.
        entity: &'static str,
        /// Row ID.
        id: Uuid,
        /// Cached status.
        cached: SettlementStatus,
        /// Derived status.
        derived: SettlementStatus,
    },
    /// A movement does not start where the previous one ended.
    BrokenChain {
        /// Item ID.
        item_id: Uuid,
        /// Movement ID.
        movement_id: Uuid,
        /// Level the previous movement ended at.
        expected_previous: i32,
        /// Level recorded on the movement.
        recorded_previous: i32,
    },
    /// A movement's new level is not previous + delta, or is negative.
    BadMovement {
        /// Item ID.
        item_id: Uuid,
        /// Movement ID.
        movement_id: Uuid,
    },
    /// The cached stock level differs from the end of the trail.
    StockLevel {
        /// Item ID.
        item_id: Uuid,
        /// Cached level.
        cached: i32,
        /// Level at the end of the movement trail.
        recomputed: i32,
    },
    /// A stored journal does not balance.
    UnbalancedJournal {
        /// Journal ID.
        journal_id: Uuid,
        /// Sum of debits.
        debit: Decimal,
        /// Sum of credits.
        credit: Decimal,
    },
}

/// Stored stock movement, reduced to what the chain check needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRecord {
    /// Movement ID.
    pub id: Uuid,
    /// Applied change.
    pub delta: i32,
    /// Level before.
    pub previous: i32,
    /// Level after.
    pub new: i32,
}

/// Checks a settlement cache against the payments recorded for it.
#[must_use]
pub fn check_settlement(
    entity: &'static str,
    id: Uuid,
    total: Decimal,
    cached_paid: Decimal,
    cached_status: SettlementStatus,
    recomputed_paid: Decimal,
) -> Vec<CacheDrift> {
    let mut drifts = Vec::new();
    if cached_paid != recomputed_paid {
        drifts.push(CacheDrift::PaidAmount {
            entity,
            id,
            cached: cached_paid,
            recomputed: recomputed_paid,
        });
    }
    let derived = SettlementStatus::derive(total, cached_paid);
    if cached_status != derived {
        drifts.push(CacheDrift::Status {
            entity,
            id,
            cached: cached_status,
            derived,
        });
    }
    drifts
}

/// Checks an item's movement trail (in recording order) and cached level.
///
/// The trail starts from zero: stock on hand at registration is itself
/// recorded as a movement.
#[must_use]
pub fn check_stock_chain(
    item_id: Uuid,
    cached_stock: i32,
    movements: &[MovementRecord],
) -> Vec<CacheDrift> {
    let mut drifts = Vec::new();
    let mut level = 0;

    for movement in movements {
        if movement.previous != level {
            drifts.push(CacheDrift::BrokenChain {
                item_id,
                movement_id: movement.id,
                expected_previous: level,
                recorded_previous: movement.previous,
            });
        }
        if movement.new < 0 || movement.previous.checked_add(movement.delta) != Some(movement.new) {
            drifts.push(CacheDrift::BadMovement {
                item_id,
                movement_id: movement.id,
            });
        }
        level = movement.new;
    }

    if cached_stock != level {
        drifts.push(CacheDrift::StockLevel {
            item_id,
            cached: cached_stock,
            recomputed: level,
        });
    }
    drifts
}

/// Checks a stored journal's totals.
#[must_use]
pub fn check_journal_balance(
    journal_id: Uuid,
    totals: JournalTotals,
    tolerance: Decimal,
) -> Option<CacheDrift> {
    (!totals.is_balanced(tolerance)).then_some(CacheDrift::UnbalancedJournal {
        journal_id,
        debit: totals.debit,
        credit: totals.credit,
    })
}
