//! Currency rounding and balance tolerance helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount in the ledger is a `rust_decimal::Decimal` in the single
//! base currency of the installation.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for currency amounts.
pub const CURRENCY_SCALE: u32 = 2;

/// Largest debit/credit difference a journal may carry (one cent).
pub const DEFAULT_BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Rounds an amount to currency precision, half away from zero.
///
/// Line-item amounts (`quantity * unit_price`) are rounded with this before
/// they reach the ledger, so totals computed from rounded lines stay exact.
#[must_use]
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns true if `a` and `b` differ by no more than `tolerance`.
#[must_use]
pub fn within_tolerance(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    (a - b).abs() <= tolerance
}
