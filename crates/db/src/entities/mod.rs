//! `SeaORM` entities.

#![allow(missing_docs)]

pub mod prelude;

pub mod accounts;
pub mod bank_reconciliations;
pub mod bank_transactions;
pub mod conversions;
pub mod invoice_items;
pub mod invoices;
pub mod items;
pub mod journal_headers;
pub mod journal_lines;
pub mod payments;
pub mod purchase_orders;
pub mod sea_orm_active_enums;
pub mod stock_movements;
