//! `SeaORM` Entity for items table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ItemType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub item_type: ItemType,
    pub current_stock: i32,
    pub reorder_level: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub unit_price: Decimal,
    pub income_account_id: Option<Uuid>,
    pub is_active: bool,
    pub version: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Returns true when the stock level has fallen to the reorder point.
    #[must_use]
    pub fn needs_reorder(&self) -> bool {
        self.item_type == ItemType::Inventory
            && bursar_core::inventory::needs_reorder(self.current_stock, self.reorder_level)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stock_movements::Entity")]
    StockMovements,
}

impl Related<super::stock_movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockMovements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
