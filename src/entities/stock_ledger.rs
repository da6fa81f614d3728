use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Document types that produce stock movements.
#[derive(
    Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum DocumentType {
    #[sea_orm(string_value = "GoodsReceipt")]
    GoodsReceipt,
    #[sea_orm(string_value = "StockAdjustment")]
    StockAdjustment,
    #[sea_orm(string_value = "StockTransfer")]
    StockTransfer,
}

/// Append-only record of one signed stock movement.
///
/// Entries are never mutated or deleted; movements applied in the same
/// posting transaction share a `transaction_id`. Replaying deltas per
/// balance key reconstructs `balance_after`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_ledger")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub document_type: DocumentType,
    pub document_id: i64,
    pub item_id: i64,
    pub warehouse_id: i64,
    pub location_id: i64,
    pub lot_number: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_delta: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub balance_after: Decimal,
    pub posted_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
