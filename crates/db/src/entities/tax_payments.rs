//! `SeaORM` Entity for tax_payments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tax_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub taxpayer_id: Uuid,
    pub filing_id: Option<Uuid>,
    pub tax_type: String,
    pub amount: i64,
    pub payment_method: String,
    pub status: String,
    pub payment_date: Date,
    #[sea_orm(unique)]
    pub confirmation_code: String,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    pub processed_at: Option<DateTimeUtc>,
    pub refunded_at: Option<DateTimeUtc>,
    pub version: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::taxpayers::Entity",
        from = "Column::TaxpayerId",
        to = "super::taxpayers::Column::Id"
    )]
    Taxpayers,
}

impl Related<super::taxpayers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Taxpayers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
