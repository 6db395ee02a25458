//! `SeaORM` Entity for taxpayers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "taxpayers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub taxpayer_type: String,
    pub status: String,
    pub name: String,
    #[sea_orm(unique)]
    pub tax_identifier: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    /// JSON array of exemption codes.
    #[sea_orm(column_type = "Text")]
    pub exemption_codes: String,
    pub annual_revenue: i64,
    pub business_type: String,
    pub industry: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tax_filings::Entity")]
    TaxFilings,
    #[sea_orm(has_many = "super::tax_payments::Entity")]
    TaxPayments,
}

impl Related<super::tax_filings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaxFilings.def()
    }
}

impl Related<super::tax_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaxPayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
