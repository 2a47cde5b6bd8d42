//! Property-based tests for journal validation.
//!
//! Accepted journals balance within tolerance; shuffling lines never changes
//! acceptance; storage ordering keeps every debit ahead of every credit.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::LedgerError;
use super::service::PostingService;
use super::types::{EntrySide, JournalLineInput, JournalTotals};
use crate::accounts::PostingTarget;

const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Strategy to generate a positive amount from 0.01 to 1,000,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn target() -> PostingTarget {
    PostingTarget::account(Uuid::new_v4())
}

/// Splits `total` into `parts` positive amounts (in cents) that sum exactly.
fn split(total_cents: i64, parts: usize) -> Vec<Decimal> {
    let parts_i64 = i64::try_from(parts).unwrap();
    let base = total_cents / parts_i64;
    let mut amounts: Vec<i64> = vec![base; parts];
    amounts[0] += total_cents - base * parts_i64;
    amounts.into_iter().map(|c| Decimal::new(c, 2)).collect()
}

/// Strategy producing balanced journals with 1-4 debits and 1-4 credits.
fn balanced_lines() -> impl Strategy<Value = Vec<JournalLineInput>> {
    (100i64..100_000_000i64, 1usize..5, 1usize..5).prop_map(|(cents, d, c)| {
        let mut lines: Vec<_> = split(cents, d)
            .into_iter()
            .map(|a| JournalLineInput::debit(target(), a))
            .collect();
        lines.extend(
            split(cents, c)
                .into_iter()
                .map(|a| JournalLineInput::credit(target(), a)),
        );
        lines
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any journal the service accepts balances within tolerance.
    #[test]
    fn prop_accepted_journals_balance(
        debits in prop::collection::vec(positive_amount(), 1..5),
        credits in prop::collection::vec(positive_amount(), 1..5),
    ) {
        let mut lines: Vec<_> = debits.iter().map(|a| JournalLineInput::debit(target(), *a)).collect();
        lines.extend(credits.iter().map(|a| JournalLineInput::credit(target(), *a)));

        let totals = JournalTotals::of(&lines);
        match PostingService::validate_lines(&lines, TOLERANCE) {
            Ok(accepted) => {
                prop_assert!((accepted.debit - accepted.credit).abs() <= TOLERANCE);
            }
            Err(LedgerError::UnbalancedJournal { debit, credit }) => {
                prop_assert_eq!(debit, totals.debit);
                prop_assert_eq!(credit, totals.credit);
                prop_assert!(totals.difference() > TOLERANCE);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other:?}"),
        }
    }

    /// Balanced journals are accepted whatever the line order.
    #[test]
    fn prop_balanced_accepted_in_any_order(
        lines in balanced_lines(),
        rotation in 0usize..8,
    ) {
        let mut rotated = lines.clone();
        let len = rotated.len();
        rotated.rotate_left(rotation % len);

        prop_assert!(PostingService::validate_lines(&lines, TOLERANCE).is_ok());
        prop_assert!(PostingService::validate_lines(&rotated, TOLERANCE).is_ok());
    }

    /// Ordering puts every debit first and preserves relative order per side.
    #[test]
    fn prop_order_lines_debits_first(lines in balanced_lines(), rotation in 0usize..8) {
        let mut shuffled = lines;
        let len = shuffled.len();
        shuffled.rotate_left(rotation % len);

        let debits_before: Vec<_> = shuffled
            .iter()
            .filter(|l| l.side() == Some(EntrySide::Debit))
            .map(|l| l.account_id)
            .collect();

        let ordered = PostingService::order_lines(shuffled);
        let first_credit = ordered
            .iter()
            .position(|l| l.side() == Some(EntrySide::Credit))
            .unwrap_or(ordered.len());

        prop_assert!(ordered[first_credit..].iter().all(|l| l.side() == Some(EntrySide::Credit)));
        let debits_after: Vec<_> = ordered[..first_credit].iter().map(|l| l.account_id).collect();
        prop_assert_eq!(debits_before, debits_after);
    }

    /// Perturbing one side past the tolerance is always rejected.
    #[test]
    fn prop_imbalance_rejected(lines in balanced_lines(), extra_cents in 2i64..1_000_000i64) {
        let mut lines = lines;
        lines[0].debit += Decimal::new(extra_cents, 2);

        let rejected = matches!(
            PostingService::validate_lines(&lines, TOLERANCE),
            Err(LedgerError::UnbalancedJournal { .. })
        );
        prop_assert!(rejected);
    }
}
