use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum AdjustmentType {
    #[sea_orm(string_value = "PhysicalCount")]
    PhysicalCount,
    #[sea_orm(string_value = "CycleCount")]
    CycleCount,
    #[sea_orm(string_value = "Damage")]
    Damage,
    #[sea_orm(string_value = "WriteOff")]
    WriteOff,
    #[sea_orm(string_value = "InitialStock")]
    InitialStock,
}

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum AdjustmentStatus {
    #[sea_orm(string_value = "Draft")]
    Draft,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Posted")]
    Posted,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

impl AdjustmentStatus {
    /// Central transition table. `Posted` and `Cancelled` are terminal.
    pub fn can_transition(&self, next: &AdjustmentStatus) -> bool {
        use AdjustmentStatus::*;
        matches!(
            (self, next),
            (Draft, Approved)
                | (Draft, Posted)
                | (Draft, Cancelled)
                | (Approved, Posted)
                | (Approved, Cancelled)
        )
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_adjustment_headers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub adjustment_number: String,
    pub warehouse_id: i64,
    pub adjustment_date: NaiveDate,
    pub adjustment_type: AdjustmentType,
    pub reason: String,
    pub status: AdjustmentStatus,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub posted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::warehouses::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouses::Column::Id"
    )]
    Warehouse,
    #[sea_orm(has_many = "super::stock_adjustment_lines::Entity")]
    StockAdjustmentLines,
}

impl Related<super::warehouses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
    }
}

impl Related<super::stock_adjustment_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockAdjustmentLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::AdjustmentStatus::*;

    #[test]
    fn transition_table() {
        assert!(Draft.can_transition(&Approved));
        assert!(Draft.can_transition(&Posted));
        assert!(Approved.can_transition(&Posted));
        assert!(!Posted.can_transition(&Draft));
        assert!(!Posted.can_transition(&Cancelled));
        assert!(!Cancelled.can_transition(&Posted));
    }
}
