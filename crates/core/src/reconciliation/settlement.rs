//! Paid amounts and settlement status.
//!
//! The status is never stored independently: it is derived from the total
//! and the paid amount every time the paid amount changes.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// Settlement state of an invoice or purchase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    /// Nothing paid yet.
    Pending,
    /// Partly paid.
    Partial,
    /// Fully paid.
    Paid,
}

impl SettlementStatus {
    /// Derives the status from a total and a paid amount.
    #[must_use]
    pub fn derive(total: Decimal, paid: Decimal) -> Self {
        if paid >= total {
            Self::Paid
        } else if paid > Decimal::ZERO {
            Self::Partial
        } else {
            Self::Pending
        }
    }

    /// Returns the storage name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Partial => "partial",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// New settlement state after a payment or a void.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementUpdate {
    /// New paid amount.
    pub paid: Decimal,
    /// Derived status.
    pub status: SettlementStatus,
    /// Balance still outstanding.
    pub remaining: Decimal,
}

impl SettlementUpdate {
    fn new(total: Decimal, paid: Decimal) -> Self {
        Self {
            paid,
            status: SettlementStatus::derive(total, paid),
            remaining: remaining(total, paid),
        }
    }
}

/// Outstanding balance, never negative.
#[must_use]
pub fn remaining(total: Decimal, paid: Decimal) -> Decimal {
    (total - paid).max(Decimal::ZERO)
}

/// Applies a payment of `amount`.
///
/// # Errors
///
/// Returns `InvalidAmount` when `amount` is not positive and `Overpayment`
/// when it exceeds the outstanding balance; both carry that balance.
pub fn apply_payment(
    total: Decimal,
    paid: Decimal,
    amount: Decimal,
) -> Result<SettlementUpdate, LedgerError> {
    let outstanding = remaining(total, paid);
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount {
            amount,
            remaining: outstanding,
        });
    }
    if amount > outstanding {
        return Err(LedgerError::Overpayment {
            amount,
            remaining: outstanding,
        });
    }
    Ok(SettlementUpdate::new(total, paid + amount))
}

/// Takes back a payment of `amount` that is being voided.
///
/// # Errors
///
/// Returns `InvalidAmount` when `amount` is not positive or larger than the
/// amount paid so far.
pub fn reverse_payment(
    total: Decimal,
    paid: Decimal,
    amount: Decimal,
) -> Result<SettlementUpdate, LedgerError> {
    if amount <= Decimal::ZERO || amount > paid {
        return Err(LedgerError::InvalidAmount {
            amount,
            remaining: remaining(total, paid),
        });
    }
    Ok(SettlementUpdate::new(total, paid - amount))
}
