//! Payments received against invoices and paid against purchase orders.

use std::fmt;

use bursar_shared::types::BranchId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::{AccountRole, PostingTarget};
use crate::ledger::{JournalLineInput, LedgerError};

/// How money changed hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Notes and coins.
    Cash,
    /// Bank transfer.
    BankTransfer,
    /// Cheque.
    Check,
    /// Card payment.
    Card,
    /// Mobile money wallet.
    MobileMoney,
}

impl PaymentMethod {
    /// Role of the account the money settles in.
    #[must_use]
    pub const fn settlement_role(self) -> AccountRole {
        match self {
            Self::Cash => AccountRole::Cash,
            Self::BankTransfer | Self::Check | Self::Card | Self::MobileMoney => AccountRole::Bank,
        }
    }

    /// Returns true if the payment is mirrored by a bank transaction record.
    #[must_use]
    pub const fn records_bank_transaction(self) -> bool {
        matches!(self, Self::Check | Self::BankTransfer)
    }

    /// Returns the storage name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::BankTransfer => "bank_transfer",
            Self::Check => "check",
            Self::Card => "card",
            Self::MobileMoney => "mobile_money",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to record a payment received against an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivePaymentInput {
    /// Invoice being paid.
    pub invoice_id: Uuid,
    /// Amount received.
    pub amount: Decimal,
    /// Payment method.
    pub method: PaymentMethod,
    /// Date received; also the journal date.
    pub payment_date: NaiveDate,
    /// Optional note.
    pub note: Option<String>,
}

/// Request to pay (part of) a purchase order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderPaymentInput {
    /// Purchase order being paid.
    pub purchase_order_id: Uuid,
    /// Amount paid.
    pub amount: Decimal,
    /// Payment method.
    pub method: PaymentMethod,
    /// Date paid; also the journal date.
    pub payment_date: NaiveDate,
    /// Optional note.
    pub note: Option<String>,
}

/// Request to register a purchase order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchaseOrder {
    /// Supplier.
    pub supplier_name: String,
    /// Order date.
    pub order_date: NaiveDate,
    /// Order total.
    pub total_amount: Decimal,
}

impl NewPurchaseOrder {
    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for a blank supplier or a
    /// non-positive total.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.supplier_name.trim().is_empty() {
            return Err(LedgerError::Validation("supplier name is required".to_string()));
        }
        if self.total_amount <= Decimal::ZERO {
            return Err(LedgerError::Validation(
                "purchase order total must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Request to void a completed payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoidPaymentInput {
    /// Payment to void.
    pub payment_id: Uuid,
    /// Date of the reversing journal.
    pub void_date: NaiveDate,
    /// Why the payment is voided.
    pub reason: String,
}

/// Lines for money received: debit cash/bank, credit receivable.
#[must_use]
pub fn build_receipt_lines(
    settlement: PostingTarget,
    receivable: PostingTarget,
    amount: Decimal,
    description: &str,
    branch_id: Option<BranchId>,
) -> Vec<JournalLineInput> {
    vec![
        JournalLineInput::debit(settlement, amount)
            .with_description(description)
            .with_branch(branch_id),
        JournalLineInput::credit(receivable, amount)
            .with_description(description)
            .with_branch(branch_id),
    ]
}

/// Lines for money paid out: debit payable, credit bank/cash.
#[must_use]
pub fn build_purchase_order_payment_lines(
    payable: PostingTarget,
    settlement: PostingTarget,
    amount: Decimal,
    description: &str,
    branch_id: Option<BranchId>,
) -> Vec<JournalLineInput> {
    vec![
        JournalLineInput::debit(payable, amount)
            .with_description(description)
            .with_branch(branch_id),
        JournalLineInput::credit(settlement, amount)
            .with_description(description)
            .with_branch(branch_id),
    ]
}
