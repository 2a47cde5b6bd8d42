//! `SeaORM` active enums.
//!
//! Stored as short strings guarded by CHECK constraints so the schema works
//! unchanged on every supported backend.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum AccountCategory {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "expense")]
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum AccountRole {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "bank")]
    Bank,
    #[sea_orm(string_value = "receivable")]
    Receivable,
    #[sea_orm(string_value = "payable")]
    Payable,
    #[sea_orm(string_value = "revenue_default")]
    RevenueDefault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum JournalKind {
    #[sea_orm(string_value = "invoice")]
    Invoice,
    #[sea_orm(string_value = "payment")]
    Payment,
    #[sea_orm(string_value = "deposit")]
    Deposit,
    #[sea_orm(string_value = "purchase_order_payment")]
    PurchaseOrderPayment,
    #[sea_orm(string_value = "reversal")]
    Reversal,
    #[sea_orm(string_value = "manual")]
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ItemType {
    #[sea_orm(string_value = "inventory")]
    Inventory,
    #[sea_orm(string_value = "service")]
    Service,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum StockOperation {
    #[sea_orm(string_value = "add")]
    Add,
    #[sea_orm(string_value = "subtract")]
    Subtract,
    #[sea_orm(string_value = "set")]
    Set,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum StockOriginType {
    #[sea_orm(string_value = "invoice")]
    Invoice,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    #[sea_orm(string_value = "opening")]
    Opening,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum SettlementStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "partial")]
    Partial,
    #[sea_orm(string_value = "paid")]
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum PaymentTarget {
    #[sea_orm(string_value = "invoice")]
    Invoice,
    #[sea_orm(string_value = "purchase_order")]
    PurchaseOrder,
    #[sea_orm(string_value = "general")]
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    #[sea_orm(string_value = "check")]
    Check,
    #[sea_orm(string_value = "card")]
    Card,
    #[sea_orm(string_value = "mobile_money")]
    MobileMoney,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "voided")]
    Voided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum BankDirection {
    #[sea_orm(string_value = "deposit")]
    Deposit,
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
}
