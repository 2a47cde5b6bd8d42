//! Conversions between stored rows and core domain types.

use bursar_core::accounts::{
    AccountCategory as CoreAccountCategory, AccountInfo, AccountRole as CoreAccountRole,
};
use bursar_core::inventory::{
    ItemType as CoreItemType, StockOperation as CoreStockOperation, StockOrigin,
};
use bursar_core::ledger::{JournalKind as CoreJournalKind, JournalLineInput};
use bursar_core::originators::PaymentMethod as CorePaymentMethod;
use bursar_core::reconciliation::{MovementRecord, SettlementStatus as CoreSettlementStatus};
use bursar_shared::types::BranchId;

use super::sea_orm_active_enums::{
    AccountCategory, AccountRole, ItemType, JournalKind, PaymentMethod, SettlementStatus,
    StockOperation, StockOriginType,
};
use super::{accounts, journal_lines, stock_movements};

/// Implements `From` both ways between a stored enum and its core twin.
macro_rules! bridge_enum {
    ($db:ident, $core:ident, [$($variant:ident),+ $(,)?]) => {
        impl From<$db> for $core {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$core> for $db {
            fn from(value: $core) -> Self {
                match value {
                    $($core::$variant => Self::$variant,)+
                }
            }
        }
    };
}

bridge_enum!(AccountCategory, CoreAccountCategory, [Asset, Liability, Equity, Income, Expense]);
bridge_enum!(AccountRole, CoreAccountRole, [Cash, Bank, Receivable, Payable, RevenueDefault]);
bridge_enum!(
    JournalKind,
    CoreJournalKind,
    [Invoice, Payment, Deposit, PurchaseOrderPayment, Reversal, Manual]
);
bridge_enum!(ItemType, CoreItemType, [Inventory, Service]);
bridge_enum!(StockOperation, CoreStockOperation, [Add, Subtract, Set, Adjustment]);
bridge_enum!(SettlementStatus, CoreSettlementStatus, [Pending, Partial, Paid]);
bridge_enum!(
    PaymentMethod,
    CorePaymentMethod,
    [Cash, BankTransfer, Check, Card, MobileMoney]
);

impl From<StockOrigin> for StockOriginType {
    fn from(origin: StockOrigin) -> Self {
        match origin {
            StockOrigin::Invoice(_) => Self::Invoice,
            StockOrigin::Adjustment => Self::Adjustment,
            StockOrigin::Opening => Self::Opening,
        }
    }
}

impl From<&accounts::Model> for AccountInfo {
    fn from(model: &accounts::Model) -> Self {
        Self {
            id: model.id,
            code: model.code.clone(),
            name: model.name.clone(),
            category: model.category.into(),
            role: model.role.map(Into::into),
            parent_id: model.parent_id,
            is_active: model.is_active,
        }
    }
}

impl From<&journal_lines::Model> for JournalLineInput {
    fn from(model: &journal_lines::Model) -> Self {
        Self {
            account_id: model.account_id,
            sub_account_id: model.sub_account_id,
            debit: model.debit,
            credit: model.credit,
            description: model.description.clone(),
            branch_id: model.branch_id.map(BranchId::from_uuid),
        }
    }
}

impl From<&stock_movements::Model> for MovementRecord {
    fn from(model: &stock_movements::Model) -> Self {
        Self {
            id: model.id,
            delta: model.delta,
            previous: model.previous_stock,
            new: model.new_stock,
        }
    }
}
