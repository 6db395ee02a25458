//! `SeaORM` Entity for tax_filings table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tax_filings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub taxpayer_id: Uuid,
    pub tax_year: i32,
    pub period: String,
    pub period_start: Date,
    pub period_end: Date,
    pub filing_type: String,
    pub status: String,
    pub gross_income: i64,
    pub taxable_income: i64,
    pub total_sales: i64,
    pub taxable_amount: i64,
    pub tax_calculated: i64,
    pub tax_paid: i64,
    pub submission_date: Option<DateTimeUtc>,
    pub acceptance_date: Option<DateTimeUtc>,
    pub due_date: DateTimeUtc,
    /// JSON array of deductions.
    #[sea_orm(column_type = "Text")]
    pub deductions: String,
    /// JSON array of credits.
    #[sea_orm(column_type = "Text")]
    pub credits: String,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
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
