//! Entity prelude.

pub use super::accounts::Entity as Accounts;
pub use super::bank_reconciliations::Entity as BankReconciliations;
pub use super::bank_transactions::Entity as BankTransactions;
pub use super::invoice_items::Entity as InvoiceItems;
pub use super::invoices::Entity as Invoices;
pub use super::items::Entity as Items;
pub use super::journal_headers::Entity as JournalHeaders;
pub use super::journal_lines::Entity as JournalLines;
pub use super::payments::Entity as Payments;
pub use super::purchase_orders::Entity as PurchaseOrders;
pub use super::stock_movements::Entity as StockMovements;
