use crate::{
    db::DbPool,
    entities::{
        stock_balances::{self, Entity as StockBalance},
        stock_ledger::{self, DocumentType, Entity as StockLedger},
    },
    errors::ServiceError,
    services::posting::BalanceKey,
};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;
use uuid::Uuid;

/// Current on-hand quantity for one balance key, zero when no row exists.
/// Usable inside a posting transaction or against the pool.
pub async fn balance_quantity<C: ConnectionTrait>(
    conn: &C,
    key: &BalanceKey,
) -> Result<Decimal, ServiceError> {
    let balance = StockBalance::find()
        .filter(stock_balances::Column::ItemId.eq(key.item_id))
        .filter(stock_balances::Column::WarehouseId.eq(key.warehouse_id))
        .filter(stock_balances::Column::LocationId.eq(key.location_id))
        .filter(stock_balances::Column::LotNumber.eq(key.lot_number.clone()))
        .one(conn)
        .await?;
    Ok(balance.map(|b| b.quantity_on_hand).unwrap_or(Decimal::ZERO))
}

/// Filters for balance queries; all optional, combined with AND.
#[derive(Debug, Clone, Default)]
pub struct BalanceFilter {
    pub item_id: Option<i64>,
    pub warehouse_id: Option<i64>,
    pub location_id: Option<i64>,
}

/// Filters for ledger queries.
#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    pub item_id: Option<i64>,
    pub warehouse_id: Option<i64>,
    pub document_type: Option<DocumentType>,
    pub transaction_id: Option<Uuid>,
}

/// Read-only queries over the balance store and the ledger.
#[derive(Clone)]
pub struct StockBalanceService {
    db_pool: Arc<DbPool>,
}

impl StockBalanceService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    pub async fn quantity(&self, key: &BalanceKey) -> Result<Decimal, ServiceError> {
        balance_quantity(self.db_pool.as_ref(), key).await
    }

    pub async fn list_balances(
        &self,
        filter: BalanceFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<stock_balances::Model>, u64), ServiceError> {
        let mut query = StockBalance::find();
        if let Some(item_id) = filter.item_id {
            query = query.filter(stock_balances::Column::ItemId.eq(item_id));
        }
        if let Some(warehouse_id) = filter.warehouse_id {
            query = query.filter(stock_balances::Column::WarehouseId.eq(warehouse_id));
        }
        if let Some(location_id) = filter.location_id {
            query = query.filter(stock_balances::Column::LocationId.eq(location_id));
        }
        let paginator = query
            .order_by_asc(stock_balances::Column::ItemId)
            .order_by_asc(stock_balances::Column::WarehouseId)
            .order_by_asc(stock_balances::Column::LocationId)
            .paginate(self.db_pool.as_ref(), per_page);
        let total = paginator.num_items().await?;
        let balances = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((balances, total))
    }

    /// Movement history, newest first.
    pub async fn list_ledger(
        &self,
        filter: LedgerFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<stock_ledger::Model>, u64), ServiceError> {
        let mut query = StockLedger::find();
        if let Some(item_id) = filter.item_id {
            query = query.filter(stock_ledger::Column::ItemId.eq(item_id));
        }
        if let Some(warehouse_id) = filter.warehouse_id {
            query = query.filter(stock_ledger::Column::WarehouseId.eq(warehouse_id));
        }
        if let Some(document_type) = filter.document_type {
            query = query.filter(stock_ledger::Column::DocumentType.eq(document_type));
        }
        if let Some(transaction_id) = filter.transaction_id {
            query = query.filter(stock_ledger::Column::TransactionId.eq(transaction_id));
        }
        let paginator = query
            .order_by_desc(stock_ledger::Column::PostedAt)
            .paginate(self.db_pool.as_ref(), per_page);
        let total = paginator.num_items().await?;
        let entries = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((entries, total))
    }
}
