//! Property-based tests for stock movements.
//!
//! No sequence of movements takes a level below zero, and every recorded
//! change satisfies `new = previous + delta`.

use proptest::prelude::*;

use super::stock::{StockOperation, compute_stock_change};

fn operation() -> impl Strategy<Value = (StockOperation, i32)> {
    prop_oneof![
        (0i32..1_000).prop_map(|d| (StockOperation::Add, d)),
        (-1_000i32..=0).prop_map(|d| (StockOperation::Subtract, d)),
        (-100i32..1_000).prop_map(|d| (StockOperation::Set, d)),
        (-1_000i32..1_000).prop_map(|d| (StockOperation::Adjustment, d)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Levels stay non-negative and chain through every movement.
    #[test]
    fn prop_stock_never_negative(
        start in 0i32..1_000,
        movements in prop::collection::vec(operation(), 1..40),
    ) {
        let mut level = start;
        for (op, delta) in movements {
            let change = compute_stock_change(level, delta, op).unwrap();
            prop_assert_eq!(change.previous, level);
            prop_assert!(change.new >= 0);
            prop_assert_eq!(change.new, change.previous + change.delta);
            level = change.new;
        }
    }

    /// A subtract never removes more than is on hand.
    #[test]
    fn prop_subtract_bounded_by_stock(start in 0i32..1_000, delta in -5_000i32..=0) {
        let change = compute_stock_change(start, delta, StockOperation::Subtract).unwrap();
        prop_assert!(change.delta >= -start);
        prop_assert!(change.delta <= 0);
    }
}
