//! `SeaORM` Entity for tax_rates table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tax_rates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tax_type: String,
    pub name: String,
    pub description: String,
    #[sea_orm(column_type = "Double")]
    pub rate: f64,
    pub bracket_type: String,
    pub min_amount: Option<i64>,
    pub max_amount: Option<i64>,
    pub status: String,
    pub category: Option<String>,
    pub jurisdiction_code: String,
    pub effective_date: Date,
    pub expiration_date: Option<Date>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
