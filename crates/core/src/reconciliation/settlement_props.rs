//! Property-based tests for settlement state.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::settlement::{SettlementStatus, apply_payment};

fn cents(max: i64) -> impl Strategy<Value = Decimal> {
    (1i64..max).prop_map(|c| Decimal::new(c, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Status is paid iff paid ≥ total, partial iff 0 < paid < total.
    #[test]
    fn prop_status_matches_paid(total in cents(10_000_000), paid_cents in 0i64..20_000_000) {
        let paid = Decimal::new(paid_cents, 2);
        let status = SettlementStatus::derive(total, paid);

        prop_assert_eq!(status == SettlementStatus::Paid, paid >= total);
        prop_assert_eq!(
            status == SettlementStatus::Partial,
            paid > Decimal::ZERO && paid < total
        );
        prop_assert_eq!(status == SettlementStatus::Pending, paid.is_zero());
    }

    /// A sequence of accepted payments never takes paid past total.
    #[test]
    fn prop_paid_never_exceeds_total(
        total in cents(1_000_000),
        payments in prop::collection::vec(cents(500_000), 1..20),
    ) {
        let mut paid = Decimal::ZERO;
        for amount in payments {
            match apply_payment(total, paid, amount) {
                Ok(update) => {
                    prop_assert!(update.paid <= total);
                    prop_assert_eq!(update.status, SettlementStatus::derive(total, update.paid));
                    paid = update.paid;
                }
                Err(_) => prop_assert!(amount > total - paid),
            }
        }
        prop_assert!(paid <= total);
    }
}
