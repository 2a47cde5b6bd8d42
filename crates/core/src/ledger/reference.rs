//! Sequential document references of the form `PREFIX-YYYY-MM-NNNNNN`.
//!
//! Sequences restart every month and are scoped by prefix. The store keeps
//! references unique, so two writers computing the same next number collide
//! there rather than here.

use chrono::{Datelike, NaiveDate};

/// Returns the month prefix shared by every reference of `prefix` in the
/// month of `date`, e.g. `INV-2026-03-`.
#[must_use]
pub fn month_prefix(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}-{:04}-{:02}-", date.year(), date.month())
}

/// Formats a reference.
#[must_use]
pub fn format_reference(prefix: &str, date: NaiveDate, sequence: u64, digits: usize) -> String {
    format!("{}{sequence:0digits$}", month_prefix(prefix, date))
}

/// Extracts the sequence number from a reference in the given month prefix.
#[must_use]
pub fn parse_sequence(reference: &str, month_prefix: &str) -> Option<u64> {
    let tail = reference.strip_prefix(month_prefix)?;
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tail.parse().ok()
}

/// Computes the reference following the highest one issued so far.
///
/// `existing` holds the references already issued in the month; anything
/// that does not parse is ignored.
#[must_use]
pub fn next_reference<'a>(
    prefix: &str,
    date: NaiveDate,
    existing: impl IntoIterator<Item = &'a str>,
    digits: usize,
) -> String {
    let month = month_prefix(prefix, date);
    let last = existing
        .into_iter()
        .filter_map(|reference| parse_sequence(reference, &month))
        .max()
        .unwrap_or(0);
    format_reference(prefix, date, last + 1, digits)
}
