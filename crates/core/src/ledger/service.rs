//! Posting service for journal validation.
//!
//! This module provides the business rules the posting engine applies
//! before and after writing a journal. It has no database dependencies:
//! the engine loads the accounts and hands them in.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{EntrySide, JournalLineInput, JournalTotals};
use crate::accounts::AccountInfo;

/// Posting service for journal validation.
pub struct PostingService;

impl PostingService {
    /// Validate the shape and balance of a journal's lines.
    ///
    /// Checks, in order:
    /// 1. at least 2 lines
    /// 2. every line has exactly one positive side and no negative side
    /// 3. debit and credit sides are both present
    /// 4. Σdebit and Σcredit differ by at most `tolerance`
    ///
    /// # Errors
    ///
    /// Returns the first rule violated.
    pub fn validate_lines(
        lines: &[JournalLineInput],
        tolerance: Decimal,
    ) -> Result<JournalTotals, LedgerError> {
        if lines.len() < 2 {
            return Err(LedgerError::InsufficientLines);
        }

        let mut has_debit = false;
        let mut has_credit = false;
        for (index, line) in lines.iter().enumerate() {
            let line_no = index + 1;
            if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
                return Err(LedgerError::InvalidLine {
                    line: line_no,
                    reason: "amounts cannot be negative",
                });
            }
            match line.side() {
                Some(EntrySide::Debit) => has_debit = true,
                Some(EntrySide::Credit) => has_credit = true,
                None if line.debit.is_zero() && line.credit.is_zero() => {
                    return Err(LedgerError::InvalidLine {
                        line: line_no,
                        reason: "amount cannot be zero",
                    });
                }
                None => {
                    return Err(LedgerError::InvalidLine {
                        line: line_no,
                        reason: "line must be either debit or credit, not both",
                    });
                }
            }
        }

        if !(has_debit && has_credit) {
            return Err(LedgerError::Validation(
                "journal needs at least one debit and one credit line".to_string(),
            ));
        }

        let totals = JournalTotals::of(lines);
        totals.ensure_balanced(tolerance)?;
        Ok(totals)
    }

    /// Order lines for storage: debits before credits, otherwise stable.
    #[must_use]
    pub fn order_lines(lines: Vec<JournalLineInput>) -> Vec<JournalLineInput> {
        let (mut debits, credits): (Vec<_>, Vec<_>) = lines
            .into_iter()
            .partition(|line| line.side() == Some(EntrySide::Debit));
        debits.extend(credits);
        debits
    }

    /// Validate the accounts a line posts against.
    ///
    /// `account` is the line's account; `sub_account` the loaded
    /// sub-account when the line names one.
    ///
    /// # Errors
    ///
    /// Returns `AccountInactive`, `NotTopLevel` or `SubAccountMismatch`.
    pub fn check_accounts(
        account: &AccountInfo,
        sub_account: Option<&AccountInfo>,
    ) -> Result<(), LedgerError> {
        if !account.is_active {
            return Err(LedgerError::AccountInactive(account.id));
        }
        if !account.is_top_level() {
            return Err(LedgerError::NotTopLevel(account.id));
        }

        if let Some(sub) = sub_account {
            if sub.parent_id != Some(account.id) {
                return Err(LedgerError::SubAccountMismatch {
                    account_id: account.id,
                    sub_account_id: sub.id,
                });
            }
            if !sub.is_active {
                return Err(LedgerError::AccountInactive(sub.id));
            }
        }

        Ok(())
    }
}
