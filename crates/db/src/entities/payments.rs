//! `SeaORM` Entity for payments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{PaymentMethod, PaymentStatus, PaymentTarget};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub target_type: PaymentTarget,
    pub target_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub payment_date: Date,
    #[sea_orm(unique)]
    pub reference: String,
    pub status: PaymentStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
    pub journal_id: Uuid,
    pub void_journal_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::journal_headers::Entity",
        from = "Column::JournalId",
        to = "super::journal_headers::Column::Id"
    )]
    JournalHeaders,
}

impl Related<super::journal_headers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalHeaders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
