use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Aggregated quality-control outcome across a receipt's lines.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum OverallQcStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Pass")]
    Pass,
    #[sea_orm(string_value = "Fail")]
    Fail,
    #[sea_orm(string_value = "Conditional")]
    Conditional,
}

/// Goods receipt note header. `posted` is terminal: once set, the receipt
/// can no longer be edited or re-posted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "goods_receipt_headers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub grn_number: String,
    pub po_header_id: i64,
    pub warehouse_id: i64,
    pub receipt_date: NaiveDate,
    pub overall_qc_status: OverallQcStatus,
    pub posted: bool,
    pub posted_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchase_order_headers::Entity",
        from = "Column::PoHeaderId",
        to = "super::purchase_order_headers::Column::Id"
    )]
    PurchaseOrderHeader,
    #[sea_orm(
        belongs_to = "super::warehouses::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouses::Column::Id"
    )]
    Warehouse,
    #[sea_orm(has_many = "super::goods_receipt_lines::Entity")]
    GoodsReceiptLines,
}

impl Related<super::purchase_order_headers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrderHeader.def()
    }
}

impl Related<super::warehouses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
    }
}

impl Related<super::goods_receipt_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GoodsReceiptLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
