//! `SeaORM` Entity for transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transaction_type: String,
    pub status: String,
    pub account_id: Uuid,
    pub source_account_id: Option<Uuid>,
    pub target_account_id: Option<Uuid>,
    pub amount: i64,
    pub currency: String,
    pub description: String,
    #[sea_orm(unique)]
    pub reference: String,
    /// JSON object of string annotations.
    #[sea_orm(column_type = "Text")]
    pub metadata: String,
    pub version: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub completed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
