//! Inclusive date ranges for ledger queries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An inclusive date range; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day included (open when `None`).
    pub from: Option<NaiveDate>,
    /// Last day included (open when `None`).
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Creates a closed range.
    #[must_use]
    pub const fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Creates a range covering everything up to and including `to`.
    #[must_use]
    pub const fn up_to(to: NaiveDate) -> Self {
        Self {
            from: None,
            to: Some(to),
        }
    }

    /// Returns true if `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }

    /// Returns true if `date` falls before the start of the range.
    #[must_use]
    pub fn is_before(&self, date: NaiveDate) -> bool {
        self.from.is_some_and(|from| date < from)
    }

    /// Returns true if the bounds are ordered (or open).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match (self.from, self.to) {
            (Some(from), Some(to)) => from <= to,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_open_range_contains_everything() {
        let range = DateRange::default();
        assert!(range.contains(date(1999, 1, 1)));
        assert!(range.contains(date(2099, 12, 31)));
        assert!(!range.is_before(date(1999, 1, 1)));
    }

    #[test]
    fn test_closed_range_is_inclusive() {
        let range = DateRange::between(date(2026, 1, 1), date(2026, 1, 31));
        assert!(range.contains(date(2026, 1, 1)));
        assert!(range.contains(date(2026, 1, 31)));
        assert!(!range.contains(date(2026, 2, 1)));
        assert!(range.is_before(date(2025, 12, 31)));
    }

    #[test]
    fn test_range_validity() {
        assert!(DateRange::between(date(2026, 1, 1), date(2026, 1, 1)).is_valid());
        assert!(!DateRange::between(date(2026, 2, 1), date(2026, 1, 1)).is_valid());
        assert!(DateRange::up_to(date(2026, 1, 1)).is_valid());
    }
}
