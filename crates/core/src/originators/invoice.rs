//! Invoice issuance.
//!
//! One debit to the receivable account for the invoice total, one credit per
//! distinct income posting target. Targets are grouped in order of first
//! appearance among the invoice lines.

use bursar_shared::types::{BranchId, round_currency};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::{AccountCategory, AccountInfo, PostingTarget};
use crate::ledger::{JournalLineInput, LedgerError};

/// One line of an invoice request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLineInput {
    /// Catalogue item, if the line sells one.
    pub item_id: Option<Uuid>,
    /// Line description.
    pub description: String,
    /// Quantity sold (positive).
    pub quantity: i32,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Income account overriding the item's and the default.
    pub income_account_id: Option<Uuid>,
}

/// Request to issue an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueInvoiceInput {
    /// Billed customer (student, parent, client).
    pub customer_name: String,
    /// Invoice date; also the journal date.
    pub invoice_date: NaiveDate,
    /// Payment due date.
    pub due_date: Option<NaiveDate>,
    /// Free-text description.
    pub description: Option<String>,
    /// Invoice lines.
    pub lines: Vec<InvoiceLineInput>,
}

impl IssueInvoiceInput {
    /// Validates the request without touching any account.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for a blank customer, no lines or
    /// a due date before the invoice date.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.customer_name.trim().is_empty() {
            return Err(LedgerError::Validation("customer name is required".to_string()));
        }
        if self.lines.is_empty() {
            return Err(LedgerError::Validation(
                "an invoice needs at least one line".to_string(),
            ));
        }
        if self.due_date.is_some_and(|due| due < self.invoice_date) {
            return Err(LedgerError::Validation(
                "due date cannot be before the invoice date".to_string(),
            ));
        }
        Ok(())
    }

    /// Description used for the journal.
    #[must_use]
    pub fn journal_description(&self, invoice_number: &str) -> String {
        match &self.description {
            Some(description) => format!("Invoice {invoice_number}: {description}"),
            None => format!("Invoice {invoice_number} - {}", self.customer_name),
        }
    }
}

/// Computes a line's amount, rounded to the currency scale.
///
/// # Errors
///
/// Returns `LedgerError::Validation` for a non-positive quantity, a
/// negative price, or an amount too large to represent.
pub fn line_amount(line: &InvoiceLineInput) -> Result<Decimal, LedgerError> {
    if line.quantity <= 0 {
        return Err(LedgerError::Validation(format!(
            "quantity must be positive on line '{}'",
            line.description
        )));
    }
    if line.unit_price < Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "unit price cannot be negative on line '{}'",
            line.description
        )));
    }
    let amount = Decimal::from(line.quantity)
        .checked_mul(line.unit_price)
        .ok_or_else(|| {
            LedgerError::Validation(format!("amount overflows on line '{}'", line.description))
        })?;
    Ok(round_currency(amount))
}

/// Checks that an invoice line credits an income account.
///
/// # Errors
///
/// Returns `LedgerError::Validation` for any other category.
pub fn ensure_income_account(account: &AccountInfo) -> Result<(), LedgerError> {
    if account.category != AccountCategory::Income {
        return Err(LedgerError::Validation(format!(
            "account {} is not an income account",
            account.code
        )));
    }
    Ok(())
}

fn overflow() -> LedgerError {
    LedgerError::Validation("invoice total overflows".to_string())
}

/// Amount credited to one income posting target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeAllocation {
    /// Income account (and sub-account).
    pub target: PostingTarget,
    /// Sum of the invoice lines posting there.
    pub amount: Decimal,
}

/// Groups priced lines by income target, in order of first appearance.
///
/// # Errors
///
/// Returns `LedgerError::Validation` when a group's sum overflows.
pub fn group_income(
    priced: &[(PostingTarget, Decimal)],
) -> Result<Vec<IncomeAllocation>, LedgerError> {
    let mut groups: Vec<IncomeAllocation> = Vec::new();
    for (target, amount) in priced {
        match groups.iter_mut().find(|g| g.target == *target) {
            Some(group) => {
                group.amount = group.amount.checked_add(*amount).ok_or_else(overflow)?;
            }
            None => groups.push(IncomeAllocation {
                target: *target,
                amount: *amount,
            }),
        }
    }
    Ok(groups)
}

/// Journal lines and total of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePosting {
    /// Invoice total.
    pub total: Decimal,
    /// Income allocations, in order of first appearance.
    pub allocations: Vec<IncomeAllocation>,
    /// Receivable debit followed by the income credits.
    pub lines: Vec<JournalLineInput>,
}

/// Builds the journal lines of an invoice.
///
/// Allocations that sum to zero (free lines) produce no credit line.
///
/// # Errors
///
/// Returns `LedgerError::Validation` when the invoice total is not positive
/// or overflows.
pub fn build_invoice_lines(
    receivable: PostingTarget,
    priced: &[(PostingTarget, Decimal)],
    description: &str,
    branch_id: Option<BranchId>,
) -> Result<InvoicePosting, LedgerError> {
    let allocations: Vec<_> = group_income(priced)?
        .into_iter()
        .filter(|a| !a.amount.is_zero())
        .collect();
    let total = allocations
        .iter()
        .try_fold(Decimal::ZERO, |sum, a| sum.checked_add(a.amount))
        .ok_or_else(overflow)?;
    if total <= Decimal::ZERO {
        return Err(LedgerError::Validation(
            "invoice total must be positive".to_string(),
        ));
    }

    let mut lines = Vec::with_capacity(allocations.len() + 1);
    lines.push(
        JournalLineInput::debit(receivable, total)
            .with_description(description)
            .with_branch(branch_id),
    );
    lines.extend(allocations.iter().map(|a| {
        JournalLineInput::credit(a.target, a.amount)
            .with_description(description)
            .with_branch(branch_id)
    }));

    Ok(InvoicePosting {
        total,
        allocations,
        lines,
    })
}
