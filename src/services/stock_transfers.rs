use crate::{
    db::DbPool,
    entities::{
        items::Entity as Item,
        stock_ledger::DocumentType,
        stock_transfer_headers::{self, Entity as StockTransferHeader, TransferStatus},
        stock_transfer_lines::{self, Entity as StockTransferLine},
        warehouse_locations::Entity as WarehouseLocation,
        warehouses::Entity as Warehouse,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        posting::{self, AppliedMovement, BalanceKey, DocumentRef, StockMovement},
        purchase_orders::flatten_transaction_error,
    },
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct StockTransfer {
    pub header: stock_transfer_headers::Model,
    pub lines: Vec<stock_transfer_lines::Model>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StockTransferLineInput {
    pub item_id: i64,
    pub from_location_id: i64,
    pub to_location_id: i64,
    pub lot_number: Option<String>,
    pub quantity: Decimal,
    #[serde(default)]
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStockTransferInput {
    pub from_warehouse_id: i64,
    pub to_warehouse_id: i64,
    pub transfer_date: NaiveDate,
    pub lines: Vec<StockTransferLineInput>,
}

/// Per-line received quantity recorded at the receiving warehouse.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferReceiptInput {
    pub transfer_line_id: i64,
    pub received_quantity: Decimal,
}

/// Service for inter-warehouse stock transfers.
#[derive(Clone)]
pub struct StockTransferService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl StockTransferService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a draft transfer between two distinct warehouses.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateStockTransferInput) -> Result<StockTransfer, ServiceError> {
        if input.from_warehouse_id == input.to_warehouse_id {
            return Err(ServiceError::ValidationError(
                "source and destination warehouses must differ".to_string(),
            ));
        }
        if input.lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "a stock transfer requires at least one line".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        for warehouse_id in [input.from_warehouse_id, input.to_warehouse_id] {
            Warehouse::find_by_id(warehouse_id)
                .one(db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("warehouse {} not found", warehouse_id))
                })?;
        }

        for (idx, line) in input.lines.iter().enumerate() {
            if line.quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "line {}: quantity must be positive",
                    idx + 1
                )));
            }
            Item::find_by_id(line.item_id).one(db).await?.ok_or_else(|| {
                ServiceError::NotFound(format!("item {} not found", line.item_id))
            })?;
            for (location_id, warehouse_id, side) in [
                (line.from_location_id, input.from_warehouse_id, "source"),
                (line.to_location_id, input.to_warehouse_id, "destination"),
            ] {
                let location = WarehouseLocation::find_by_id(location_id)
                    .one(db)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("location {} not found", location_id))
                    })?;
                if location.warehouse_id != warehouse_id {
                    return Err(ServiceError::ValidationError(format!(
                        "line {}: {} location {} is not in warehouse {}",
                        idx + 1,
                        side,
                        location_id,
                        warehouse_id
                    )));
                }
            }
        }

        let now = Utc::now();
        let transfer_number = super::document_number("TRF");

        let created = self
            .db_pool
            .transaction::<_, StockTransfer, ServiceError>(move |txn| {
                Box::pin(async move {
                    let header = stock_transfer_headers::ActiveModel {
                        transfer_number: Set(transfer_number),
                        from_warehouse_id: Set(input.from_warehouse_id),
                        to_warehouse_id: Set(input.to_warehouse_id),
                        transfer_date: Set(input.transfer_date),
                        status: Set(TransferStatus::Draft),
                        posted_at: Set(None),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    let mut lines = Vec::with_capacity(input.lines.len());
                    for line in &input.lines {
                        let model = stock_transfer_lines::ActiveModel {
                            transfer_header_id: Set(header.id),
                            item_id: Set(line.item_id),
                            from_location_id: Set(line.from_location_id),
                            to_location_id: Set(line.to_location_id),
                            lot_number: Set(line.lot_number.clone()),
                            quantity: Set(line.quantity),
                            received_quantity: Set(None),
                            unit_cost: Set(line.unit_cost),
                            created_at: Set(now),
                            updated_at: Set(now),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await?;
                        lines.push(model);
                    }

                    Ok(StockTransfer { header, lines })
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        info!(transfer_id = created.header.id, "stock transfer created");
        self.event_sender
            .send(Event::StockTransferCreated(created.header.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn approve(&self, id: i64) -> Result<StockTransfer, ServiceError> {
        self.transition(id, TransferStatus::Draft, TransferStatus::Approved)
            .await
    }

    #[instrument(skip(self))]
    pub async fn ship(&self, id: i64) -> Result<StockTransfer, ServiceError> {
        self.transition(id, TransferStatus::Approved, TransferStatus::Shipped)
            .await
    }

    /// Marks the transfer received, recording per-line received quantities.
    /// A received quantity may be below the shipped quantity but never
    /// above it; the shortfall stays in transit and is not credited.
    #[instrument(skip(self, receipts))]
    pub async fn receive(
        &self,
        id: i64,
        receipts: Vec<TransferReceiptInput>,
    ) -> Result<StockTransfer, ServiceError> {
        let existing = self.get(id).await?;
        if !existing
            .header
            .status
            .can_transition(&TransferStatus::Received)
        {
            return Err(ServiceError::InvalidState(format!(
                "stock transfer {} is {:?} and cannot be received",
                id, existing.header.status
            )));
        }

        let lines: HashMap<i64, &stock_transfer_lines::Model> =
            existing.lines.iter().map(|l| (l.id, l)).collect();
        for receipt in &receipts {
            let line = lines.get(&receipt.transfer_line_id).ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "line {} does not belong to stock transfer {}",
                    receipt.transfer_line_id, id
                ))
            })?;
            if receipt.received_quantity < Decimal::ZERO
                || receipt.received_quantity > line.quantity
            {
                return Err(ServiceError::ValidationError(format!(
                    "line {}: received quantity {} must be between 0 and {}",
                    receipt.transfer_line_id, receipt.received_quantity, line.quantity
                )));
            }
        }

        let now = Utc::now();
        let updated = self
            .db_pool
            .transaction::<_, StockTransfer, ServiceError>(move |txn| {
                Box::pin(async move {
                    for receipt in &receipts {
                        StockTransferLine::update_many()
                            .set(stock_transfer_lines::ActiveModel {
                                received_quantity: Set(Some(receipt.received_quantity)),
                                updated_at: Set(now),
                                ..Default::default()
                            })
                            .filter(
                                stock_transfer_lines::Column::Id.eq(receipt.transfer_line_id),
                            )
                            .exec(txn)
                            .await?;
                    }

                    let result = StockTransferHeader::update_many()
                        .set(stock_transfer_headers::ActiveModel {
                            status: Set(TransferStatus::Received),
                            updated_at: Set(now),
                            ..Default::default()
                        })
                        .filter(stock_transfer_headers::Column::Id.eq(id))
                        .filter(
                            stock_transfer_headers::Column::Status.eq(TransferStatus::Shipped),
                        )
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Err(ServiceError::InvalidState(format!(
                            "stock transfer {} is no longer Shipped",
                            id
                        )));
                    }

                    let header = StockTransferHeader::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("stock transfer {} not found", id))
                        })?;
                    let lines = StockTransferLine::find()
                        .filter(stock_transfer_lines::Column::TransferHeaderId.eq(id))
                        .order_by_asc(stock_transfer_lines::Column::Id)
                        .all(txn)
                        .await?;

                    Ok(StockTransfer { header, lines })
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        Ok(updated)
    }

    /// Posts the transfer: debits each line's source location by the full
    /// shipped quantity and credits the destination by the received
    /// quantity, or the shipped quantity when no receipt was recorded.
    ///
    /// All movements share one transaction id; an insufficient source
    /// balance rolls back the whole posting.
    #[instrument(skip(self))]
    pub async fn post(&self, id: i64) -> Result<StockTransfer, ServiceError> {
        let existing = self.get(id).await?;
        if existing.header.status == TransferStatus::Posted {
            return Err(ServiceError::AlreadyPosted(format!(
                "stock transfer {} is already posted",
                id
            )));
        }
        if !existing
            .header
            .status
            .can_transition(&TransferStatus::Posted)
        {
            return Err(ServiceError::InvalidState(format!(
                "stock transfer {} is {:?} and cannot be posted",
                id, existing.header.status
            )));
        }

        let transaction_id = Uuid::new_v4();
        let from_warehouse_id = existing.header.from_warehouse_id;
        let to_warehouse_id = existing.header.to_warehouse_id;
        let lines = existing.lines.clone();
        let now = Utc::now();

        let (posted, applied) = self
            .db_pool
            .transaction::<_, (StockTransfer, Vec<AppliedMovement>), ServiceError>(move |txn| {
                Box::pin(async move {
                    let result = StockTransferHeader::update_many()
                        .set(stock_transfer_headers::ActiveModel {
                            status: Set(TransferStatus::Posted),
                            posted_at: Set(Some(now)),
                            updated_at: Set(now),
                            ..Default::default()
                        })
                        .filter(stock_transfer_headers::Column::Id.eq(id))
                        .filter(stock_transfer_headers::Column::Status.is_in([
                            TransferStatus::Draft,
                            TransferStatus::Approved,
                            TransferStatus::Shipped,
                            TransferStatus::Received,
                        ]))
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Err(ServiceError::AlreadyPosted(format!(
                            "stock transfer {} is already posted",
                            id
                        )));
                    }

                    let mut movements = Vec::with_capacity(lines.len() * 2);
                    for line in &lines {
                        let credit = line.received_quantity.unwrap_or(line.quantity);
                        movements.push(StockMovement {
                            key: BalanceKey::new(
                                line.item_id,
                                from_warehouse_id,
                                line.from_location_id,
                                line.lot_number.as_deref(),
                            ),
                            quantity_delta: -line.quantity,
                        });
                        movements.push(StockMovement {
                            key: BalanceKey::new(
                                line.item_id,
                                to_warehouse_id,
                                line.to_location_id,
                                line.lot_number.as_deref(),
                            ),
                            quantity_delta: credit,
                        });
                    }

                    let document = DocumentRef {
                        document_type: DocumentType::StockTransfer,
                        document_id: id,
                    };
                    let applied =
                        posting::apply_movements(txn, &document, transaction_id, movements)
                            .await?;

                    let header = StockTransferHeader::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("stock transfer {} not found", id))
                        })?;
                    let lines = StockTransferLine::find()
                        .filter(stock_transfer_lines::Column::TransferHeaderId.eq(id))
                        .order_by_asc(stock_transfer_lines::Column::Id)
                        .all(txn)
                        .await?;

                    Ok((StockTransfer { header, lines }, applied))
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        info!(transfer_id = id, %transaction_id, "stock transfer posted");
        self.event_sender
            .send(Event::StockTransferPosted {
                transfer_id: id,
                transaction_id,
            })
            .await
            .map_err(ServiceError::EventError)?;
        super::notify_stock_levels(&self.event_sender, applied).await?;

        Ok(posted)
    }

    /// Cancels a transfer in any pre-posted status.
    #[instrument(skip(self))]
    pub async fn cancel(&self, id: i64) -> Result<StockTransfer, ServiceError> {
        let existing = self.get(id).await?;
        if !existing
            .header
            .status
            .can_transition(&TransferStatus::Cancelled)
        {
            return Err(ServiceError::InvalidState(format!(
                "stock transfer {} is {:?} and cannot be cancelled",
                id, existing.header.status
            )));
        }

        let result = StockTransferHeader::update_many()
            .set(stock_transfer_headers::ActiveModel {
                status: Set(TransferStatus::Cancelled),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(stock_transfer_headers::Column::Id.eq(id))
            .filter(stock_transfer_headers::Column::Status.is_in([
                TransferStatus::Draft,
                TransferStatus::Approved,
                TransferStatus::Shipped,
                TransferStatus::Received,
            ]))
            .exec(self.db_pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::InvalidState(format!(
                "stock transfer {} is already terminal",
                id
            )));
        }

        self.get(id).await
    }

    pub async fn get(&self, id: i64) -> Result<StockTransfer, ServiceError> {
        let db = self.db_pool.as_ref();
        let header = StockTransferHeader::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("stock transfer {} not found", id)))?;
        let lines = StockTransferLine::find()
            .filter(stock_transfer_lines::Column::TransferHeaderId.eq(id))
            .order_by_asc(stock_transfer_lines::Column::Id)
            .all(db)
            .await?;
        Ok(StockTransfer { header, lines })
    }

    pub async fn list(
        &self,
        page: u64,
        per_page: u64,
        status: Option<TransferStatus>,
    ) -> Result<(Vec<stock_transfer_headers::Model>, u64), ServiceError> {
        let mut query = StockTransferHeader::find();
        if let Some(status) = status {
            query = query.filter(stock_transfer_headers::Column::Status.eq(status));
        }
        let paginator = query
            .order_by_desc(stock_transfer_headers::Column::Id)
            .paginate(self.db_pool.as_ref(), per_page);
        let total = paginator.num_items().await?;
        let headers = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((headers, total))
    }

    async fn transition(
        &self,
        id: i64,
        from: TransferStatus,
        to: TransferStatus,
    ) -> Result<StockTransfer, ServiceError> {
        let existing = self.get(id).await?;
        if !existing.header.status.can_transition(&to) || existing.header.status != from {
            return Err(ServiceError::InvalidState(format!(
                "stock transfer {} is {:?} and cannot move to {:?}",
                id, existing.header.status, to
            )));
        }

        let result = StockTransferHeader::update_many()
            .set(stock_transfer_headers::ActiveModel {
                status: Set(to.clone()),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(stock_transfer_headers::Column::Id.eq(id))
            .filter(stock_transfer_headers::Column::Status.eq(from))
            .exec(self.db_pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::InvalidState(format!(
                "stock transfer {} changed status concurrently",
                id
            )));
        }

        self.get(id).await
    }
}
