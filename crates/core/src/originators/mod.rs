//! Transaction originators.
//!
//! Each originator turns a business event into journal lines. The functions
//! here are pure: accounts are resolved by the caller and passed in as
//! posting targets, and the lines come back ready for the posting engine
//! with every debit ahead of every credit.

pub mod deposit;
pub mod invoice;
pub mod payment;
pub mod reversal;

pub use deposit::{DepositInput, build_deposit_lines};
pub use invoice::{
    IncomeAllocation, InvoiceLineInput, InvoicePosting, IssueInvoiceInput, build_invoice_lines,
    ensure_income_account, group_income, line_amount,
};
pub use payment::{
    NewPurchaseOrder, PaymentMethod, PurchaseOrderPaymentInput, ReceivePaymentInput,
    VoidPaymentInput, build_purchase_order_payment_lines, build_receipt_lines,
};
pub use reversal::{ReverseJournalInput, build_reversal_lines, ensure_reversible};
