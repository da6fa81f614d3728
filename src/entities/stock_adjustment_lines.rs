use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stock adjustment line. `previous_quantity`, `adjustment_quantity` and
/// `new_quantity` are captured for display at draft time and refreshed from
/// the live balance when the adjustment posts.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_adjustment_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub adjustment_header_id: i64,
    pub item_id: i64,
    pub location_id: i64,
    pub lot_number: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub previous_quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub physical_quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub adjustment_quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub new_quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub unit_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stock_adjustment_headers::Entity",
        from = "Column::AdjustmentHeaderId",
        to = "super::stock_adjustment_headers::Column::Id"
    )]
    StockAdjustmentHeader,
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id"
    )]
    Item,
}

impl Related<super::stock_adjustment_headers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockAdjustmentHeader.def()
    }
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
