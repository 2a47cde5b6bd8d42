//! Ledger domain types for journal posting.

use std::fmt;
use std::str::FromStr;

use bursar_shared::types::{BranchId, within_tolerance};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::LedgerError;
use crate::accounts::PostingTarget;
use crate::context::ActorContext;

/// Business event that produced a journal.
///
/// The kind scopes reference numbering: references are unique per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalKind {
    /// Sales invoice issued.
    Invoice,
    /// Payment received against an invoice.
    Payment,
    /// Money deposited into an asset account.
    Deposit,
    /// Payment made against a purchase order.
    PurchaseOrderPayment,
    /// Reversal of an earlier journal.
    Reversal,
    /// Manual journal entry.
    Manual,
}

impl JournalKind {
    /// All kinds.
    pub const ALL: [Self; 6] = [
        Self::Invoice,
        Self::Payment,
        Self::Deposit,
        Self::PurchaseOrderPayment,
        Self::Reversal,
        Self::Manual,
    ];

    /// Reference prefix for this kind.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Invoice => "INV",
            Self::Payment => "PAY",
            Self::Deposit => "DEP",
            Self::PurchaseOrderPayment => "POP",
            Self::Reversal => "REV",
            Self::Manual => "JNL",
        }
    }

    /// Returns the storage name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Payment => "payment",
            Self::Deposit => "deposit",
            Self::PurchaseOrderPayment => "purchase_order_payment",
            Self::Reversal => "reversal",
            Self::Manual => "manual",
        }
    }

    /// Returns true if a journal of this kind can be reversed on its own.
    ///
    /// Invoice and payment journals carry settlement or stock side effects
    /// and are undone through their originators instead.
    #[must_use]
    pub const fn is_directly_reversible(self) -> bool {
        matches!(self, Self::Deposit | Self::Manual)
    }
}

impl fmt::Display for JournalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JournalKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| LedgerError::Validation(format!("unknown journal kind '{s}'")))
    }
}

/// Side of a journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    /// Debit line.
    Debit,
    /// Credit line.
    Credit,
}

/// One journal line to be posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLineInput {
    /// Top-level account.
    pub account_id: Uuid,
    /// Optional sub-account of `account_id`.
    pub sub_account_id: Option<Uuid>,
    /// Debit amount (zero on credit lines).
    pub debit: Decimal,
    /// Credit amount (zero on debit lines).
    pub credit: Decimal,
    /// Line description.
    pub description: Option<String>,
    /// Branch stamped on the line.
    pub branch_id: Option<BranchId>,
}

impl JournalLineInput {
    /// Creates a debit line against `target`.
    #[must_use]
    pub fn debit(target: PostingTarget, amount: Decimal) -> Self {
        Self {
            account_id: target.account_id,
            sub_account_id: target.sub_account_id,
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
            branch_id: None,
        }
    }

    /// Creates a credit line against `target`.
    #[must_use]
    pub fn credit(target: PostingTarget, amount: Decimal) -> Self {
        Self {
            account_id: target.account_id,
            sub_account_id: target.sub_account_id,
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
            branch_id: None,
        }
    }

    /// Sets the line description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the line branch.
    #[must_use]
    pub const fn with_branch(mut self, branch_id: Option<BranchId>) -> Self {
        self.branch_id = branch_id;
        self
    }

    /// Returns the account (and sub-account) this line posts against.
    #[must_use]
    pub const fn target(&self) -> PostingTarget {
        PostingTarget {
            account_id: self.account_id,
            sub_account_id: self.sub_account_id,
        }
    }

    /// Returns the side of the line if exactly one side is positive.
    #[must_use]
    pub fn side(&self) -> Option<EntrySide> {
        match (self.debit > Decimal::ZERO, self.credit > Decimal::ZERO) {
            (true, false) if self.credit.is_zero() => Some(EntrySide::Debit),
            (false, true) if self.debit.is_zero() => Some(EntrySide::Credit),
            _ => None,
        }
    }

    /// Returns the same line on the opposite side.
    #[must_use]
    pub fn swapped(&self) -> Self {
        Self {
            debit: self.credit,
            credit: self.debit,
            ..self.clone()
        }
    }
}

/// Input for posting a journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostJournalInput {
    /// Business event kind.
    pub kind: JournalKind,
    /// Accounting date.
    pub journal_date: NaiveDate,
    /// Pre-allocated reference; generated when absent.
    pub reference: Option<String>,
    /// Journal description.
    pub description: String,
    /// Who posts the journal.
    pub actor: ActorContext,
    /// Journal this one reverses.
    pub reverses_journal_id: Option<Uuid>,
    /// The lines (at least 2).
    pub lines: Vec<JournalLineInput>,
}

/// Totals of a journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalTotals {
    /// Sum of debits.
    pub debit: Decimal,
    /// Sum of credits.
    pub credit: Decimal,
}

impl JournalTotals {
    /// Sums the given lines.
    #[must_use]
    pub fn of<'a>(lines: impl IntoIterator<Item = &'a JournalLineInput>) -> Self {
        lines.into_iter().fold(Self::default(), |acc, line| Self {
            debit: acc.debit + line.debit,
            credit: acc.credit + line.credit,
        })
    }

    /// Absolute difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        (self.debit - self.credit).abs()
    }

    /// Returns true if debits equal credits within `tolerance`.
    #[must_use]
    pub fn is_balanced(&self, tolerance: Decimal) -> bool {
        within_tolerance(self.debit, self.credit, tolerance)
    }

    /// Converts an imbalance into the matching error.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::UnbalancedJournal` when the totals differ by
    /// more than `tolerance`.
    pub fn ensure_balanced(&self, tolerance: Decimal) -> Result<(), LedgerError> {
        if self.is_balanced(tolerance) {
            Ok(())
        } else {
            Err(LedgerError::UnbalancedJournal {
                debit: self.debit,
                credit: self.credit,
            })
        }
    }
}

impl Default for JournalTotals {
    fn default() -> Self {
        Self {
            debit: Decimal::ZERO,
            credit: Decimal::ZERO,
        }
    }
}
