use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum TransferStatus {
    #[sea_orm(string_value = "Draft")]
    Draft,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Shipped")]
    Shipped,
    #[sea_orm(string_value = "Received")]
    Received,
    #[sea_orm(string_value = "Posted")]
    Posted,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

impl TransferStatus {
    /// Central transition table. Forward only; any pre-posted status may be
    /// cancelled; `Posted` and `Cancelled` are terminal.
    pub fn can_transition(&self, next: &TransferStatus) -> bool {
        use TransferStatus::*;
        match (self, next) {
            (Posted, _) | (Cancelled, _) => false,
            (_, Cancelled) => true,
            (Draft, Approved) => true,
            (Approved, Shipped) => true,
            (Shipped, Received) => true,
            (Draft, Posted) | (Approved, Posted) | (Shipped, Posted) | (Received, Posted) => true,
            _ => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Posted | TransferStatus::Cancelled)
    }
}

/// Stock transfer header. Source and destination warehouses always differ.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_transfer_headers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub transfer_number: String,
    pub from_warehouse_id: i64,
    pub to_warehouse_id: i64,
    pub transfer_date: NaiveDate,
    pub status: TransferStatus,
    pub posted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stock_transfer_lines::Entity")]
    StockTransferLines,
}

impl Related<super::stock_transfer_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockTransferLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::TransferStatus::*;

    #[test]
    fn transition_table() {
        assert!(Draft.can_transition(&Approved));
        assert!(Approved.can_transition(&Shipped));
        assert!(Shipped.can_transition(&Received));
        assert!(Received.can_transition(&Posted));
        assert!(Draft.can_transition(&Posted));
        assert!(Shipped.can_transition(&Cancelled));
        assert!(!Posted.can_transition(&Cancelled));
        assert!(!Cancelled.can_transition(&Draft));
        assert!(!Received.can_transition(&Shipped));
    }
}
