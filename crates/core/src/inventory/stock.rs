//! Stock movement arithmetic.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::LedgerError;

/// Whether an item keeps a stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Physical goods with a stock level.
    Inventory,
    /// Services; never tracked.
    Service,
}

impl ItemType {
    /// Returns true if movements are recorded for this item type.
    #[must_use]
    pub const fn is_stock_tracked(self) -> bool {
        matches!(self, Self::Inventory)
    }
}

/// How a movement's delta is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockOperation {
    /// Receive stock; delta must be ≥ 0.
    Add,
    /// Issue stock; delta must be ≤ 0, floored at zero.
    Subtract,
    /// Replace the level; delta is the target level.
    Set,
    /// Manual correction; signed delta, floored at zero.
    Adjustment,
}

impl StockOperation {
    /// Returns the storage name of the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Set => "set",
            Self::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for StockOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What caused a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum StockOrigin {
    /// Sale on an invoice.
    Invoice(Uuid),
    /// Manual adjustment.
    Adjustment,
    /// Stock on hand when the item was registered.
    Opening,
}

impl StockOrigin {
    /// Returns the id of the originating record, if any.
    #[must_use]
    pub const fn origin_id(self) -> Option<Uuid> {
        match self {
            Self::Invoice(id) => Some(id),
            Self::Adjustment | Self::Opening => None,
        }
    }
}

/// Result of applying a movement to a stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockChange {
    /// Level before the movement.
    pub previous: i32,
    /// Level after the movement.
    pub new: i32,
    /// Change actually applied (`new - previous`).
    pub delta: i32,
}

/// Computes the effect of a movement on `previous`.
///
/// The returned delta is the change actually applied, which differs from the
/// requested one when the level is floored at zero or for `Set`.
///
/// # Errors
///
/// Returns `LedgerError::Validation` when the delta's sign does not fit the
/// operation or the result does not fit the stock range.
pub fn compute_stock_change(
    previous: i32,
    delta: i32,
    operation: StockOperation,
) -> Result<StockChange, LedgerError> {
    let target = match operation {
        StockOperation::Add => {
            if delta < 0 {
                return Err(LedgerError::Validation(
                    "add movements need a non-negative quantity".to_string(),
                ));
            }
            previous
                .checked_add(delta)
                .ok_or_else(|| LedgerError::Validation("stock level overflow".to_string()))?
        }
        StockOperation::Subtract => {
            if delta > 0 {
                return Err(LedgerError::Validation(
                    "subtract movements need a non-positive quantity".to_string(),
                ));
            }
            previous.saturating_add(delta)
        }
        StockOperation::Set => delta,
        StockOperation::Adjustment => previous
            .checked_add(delta)
            .ok_or_else(|| LedgerError::Validation("stock level overflow".to_string()))?,
    };

    let new = target.max(0);
    Ok(StockChange {
        previous,
        new,
        delta: new - previous,
    })
}

/// Returns true when the level has fallen to the reorder point.
#[must_use]
pub const fn needs_reorder(current_stock: i32, reorder_level: i32) -> bool {
    reorder_level > 0 && current_stock <= reorder_level
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(10, 5, StockOperation::Add, 15, 5)]
    #[case(10, -3, StockOperation::Subtract, 7, -3)]
    #[case(2, -5, StockOperation::Subtract, 0, -2)]
    #[case(10, 4, StockOperation::Set, 4, -6)]
    #[case(10, -4, StockOperation::Set, 0, -10)]
    #[case(3, -7, StockOperation::Adjustment, 0, -3)]
    #[case(3, 7, StockOperation::Adjustment, 10, 7)]
    fn test_compute_stock_change(
        #[case] previous: i32,
        #[case] delta: i32,
        #[case] operation: StockOperation,
        #[case] expected_new: i32,
        #[case] expected_delta: i32,
    ) {
        let change = compute_stock_change(previous, delta, operation).unwrap();
        assert_eq!(change.previous, previous);
        assert_eq!(change.new, expected_new);
        assert_eq!(change.delta, expected_delta);
    }

    #[test]
    fn test_sign_mismatch_rejected() {
        assert!(compute_stock_change(5, -1, StockOperation::Add).is_err());
        assert!(compute_stock_change(5, 1, StockOperation::Subtract).is_err());
    }

    #[test]
    fn test_add_overflow_rejected() {
        assert!(compute_stock_change(i32::MAX, 1, StockOperation::Add).is_err());
    }

    #[test]
    fn test_needs_reorder() {
        assert!(needs_reorder(5, 5));
        assert!(needs_reorder(0, 1));
        assert!(!needs_reorder(6, 5));
        assert!(!needs_reorder(0, 0));
    }

    #[test]
    fn test_service_items_not_tracked() {
        assert!(ItemType::Inventory.is_stock_tracked());
        assert!(!ItemType::Service.is_stock_tracked());
    }
}
