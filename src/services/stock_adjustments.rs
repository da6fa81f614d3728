use crate::{
    config::InventoryConfig,
    db::DbPool,
    entities::{
        items::Entity as Item,
        stock_adjustment_headers::{
            self, AdjustmentStatus, AdjustmentType, Entity as StockAdjustmentHeader,
        },
        stock_adjustment_lines::{self, Entity as StockAdjustmentLine},
        stock_ledger::DocumentType,
        warehouse_locations::Entity as WarehouseLocation,
        warehouses::Entity as Warehouse,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        posting::{self, AppliedMovement, BalanceKey, DocumentRef, StockMovement},
        purchase_orders::flatten_transaction_error,
        stock_balances::balance_quantity,
    },
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct StockAdjustment {
    pub header: stock_adjustment_headers::Model,
    pub lines: Vec<stock_adjustment_lines::Model>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StockAdjustmentLineInput {
    pub item_id: i64,
    pub location_id: i64,
    pub lot_number: Option<String>,
    /// The counted quantity the balance should be set to.
    pub physical_quantity: Decimal,
    #[serde(default)]
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStockAdjustmentInput {
    pub warehouse_id: i64,
    pub adjustment_date: NaiveDate,
    pub adjustment_type: AdjustmentType,
    pub reason: String,
    pub lines: Vec<StockAdjustmentLineInput>,
}

/// Service for stock adjustments: declared physical counts reconciled
/// against the live balance at posting time.
#[derive(Clone)]
pub struct StockAdjustmentService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
    inventory: InventoryConfig,
}

impl StockAdjustmentService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, inventory: InventoryConfig) -> Self {
        Self {
            db_pool,
            event_sender,
            inventory,
        }
    }

    /// Creates a draft adjustment. `previous_quantity` is a snapshot of the
    /// balance at draft time, kept for display; posting re-reads the live
    /// balance.
    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        input: CreateStockAdjustmentInput,
    ) -> Result<StockAdjustment, ServiceError> {
        if input.lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "a stock adjustment requires at least one line".to_string(),
            ));
        }
        if input.reason.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "a stock adjustment requires a reason".to_string(),
            ));
        }

        let db = self.db_pool.as_ref();
        Warehouse::find_by_id(input.warehouse_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("warehouse {} not found", input.warehouse_id))
            })?;

        let mut snapshots = Vec::with_capacity(input.lines.len());
        for (idx, line) in input.lines.iter().enumerate() {
            if line.physical_quantity < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "line {}: physical quantity must not be negative",
                    idx + 1
                )));
            }
            Item::find_by_id(line.item_id).one(db).await?.ok_or_else(|| {
                ServiceError::NotFound(format!("item {} not found", line.item_id))
            })?;
            let location = WarehouseLocation::find_by_id(line.location_id)
                .one(db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("location {} not found", line.location_id))
                })?;
            if location.warehouse_id != input.warehouse_id {
                return Err(ServiceError::ValidationError(format!(
                    "line {}: location {} is not in warehouse {}",
                    idx + 1,
                    line.location_id,
                    input.warehouse_id
                )));
            }

            let key = BalanceKey::new(
                line.item_id,
                input.warehouse_id,
                line.location_id,
                line.lot_number.as_deref(),
            );
            snapshots.push(balance_quantity(db, &key).await?);
        }

        let now = Utc::now();
        let adjustment_number = super::document_number("ADJ");

        let created = self
            .db_pool
            .transaction::<_, StockAdjustment, ServiceError>(move |txn| {
                Box::pin(async move {
                    let header = stock_adjustment_headers::ActiveModel {
                        adjustment_number: Set(adjustment_number),
                        warehouse_id: Set(input.warehouse_id),
                        adjustment_date: Set(input.adjustment_date),
                        adjustment_type: Set(input.adjustment_type.clone()),
                        reason: Set(input.reason.clone()),
                        status: Set(AdjustmentStatus::Draft),
                        approved_by: Set(None),
                        approved_at: Set(None),
                        posted_at: Set(None),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    let mut lines = Vec::with_capacity(input.lines.len());
                    for (line, previous) in input.lines.iter().zip(snapshots) {
                        let model = stock_adjustment_lines::ActiveModel {
                            adjustment_header_id: Set(header.id),
                            item_id: Set(line.item_id),
                            location_id: Set(line.location_id),
                            lot_number: Set(line.lot_number.clone()),
                            previous_quantity: Set(previous),
                            physical_quantity: Set(line.physical_quantity),
                            adjustment_quantity: Set(line.physical_quantity - previous),
                            new_quantity: Set(line.physical_quantity),
                            unit_cost: Set(line.unit_cost),
                            created_at: Set(now),
                            updated_at: Set(now),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await?;
                        lines.push(model);
                    }

                    Ok(StockAdjustment { header, lines })
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        info!(
            adjustment_id = created.header.id,
            "stock adjustment created"
        );
        self.event_sender
            .send(Event::StockAdjustmentCreated(created.header.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    /// Approves a draft adjustment.
    #[instrument(skip(self))]
    pub async fn approve(
        &self,
        id: i64,
        approved_by: String,
    ) -> Result<StockAdjustment, ServiceError> {
        let existing = self.get(id).await?;
        if !existing
            .header
            .status
            .can_transition(&AdjustmentStatus::Approved)
        {
            return Err(ServiceError::InvalidState(format!(
                "stock adjustment {} is {:?} and cannot be approved",
                id, existing.header.status
            )));
        }

        let now = Utc::now();
        let result = StockAdjustmentHeader::update_many()
            .set(stock_adjustment_headers::ActiveModel {
                status: Set(AdjustmentStatus::Approved),
                approved_by: Set(Some(approved_by)),
                approved_at: Set(Some(now)),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(stock_adjustment_headers::Column::Id.eq(id))
            .filter(stock_adjustment_headers::Column::Status.eq(AdjustmentStatus::Draft))
            .exec(self.db_pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::InvalidState(format!(
                "stock adjustment {} is no longer Draft",
                id
            )));
        }

        self.get(id).await
    }

    /// Posts the adjustment.
    ///
    /// The declared physical count is authoritative: each line's movement is
    /// `physical_quantity − live balance`, with the balance re-read inside
    /// the posting transaction. Lines whose balance already matches the
    /// count produce no movement and no ledger entry.
    #[instrument(skip(self))]
    pub async fn post(&self, id: i64) -> Result<StockAdjustment, ServiceError> {
        let existing = self.get(id).await?;
        if existing.header.status == AdjustmentStatus::Posted {
            return Err(ServiceError::AlreadyPosted(format!(
                "stock adjustment {} is already posted",
                id
            )));
        }
        if self.inventory.require_adjustment_approval
            && existing.header.status != AdjustmentStatus::Approved
        {
            return Err(ServiceError::InvalidState(format!(
                "stock adjustment {} must be approved before posting",
                id
            )));
        }
        if !existing
            .header
            .status
            .can_transition(&AdjustmentStatus::Posted)
        {
            return Err(ServiceError::InvalidState(format!(
                "stock adjustment {} is {:?} and cannot be posted",
                id, existing.header.status
            )));
        }

        let transaction_id = Uuid::new_v4();
        let warehouse_id = existing.header.warehouse_id;
        let lines = existing.lines.clone();
        let now = Utc::now();

        let (posted, applied) = self
            .db_pool
            .transaction::<_, (StockAdjustment, Vec<AppliedMovement>), ServiceError>(move |txn| {
                Box::pin(async move {
                    let result = StockAdjustmentHeader::update_many()
                        .set(stock_adjustment_headers::ActiveModel {
                            status: Set(AdjustmentStatus::Posted),
                            posted_at: Set(Some(now)),
                            updated_at: Set(now),
                            ..Default::default()
                        })
                        .filter(stock_adjustment_headers::Column::Id.eq(id))
                        .filter(stock_adjustment_headers::Column::Status.is_in([
                            AdjustmentStatus::Draft,
                            AdjustmentStatus::Approved,
                        ]))
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Err(ServiceError::AlreadyPosted(format!(
                            "stock adjustment {} is already posted",
                            id
                        )));
                    }

                    let mut movements = Vec::with_capacity(lines.len());
                    for line in &lines {
                        let key = BalanceKey::new(
                            line.item_id,
                            warehouse_id,
                            line.location_id,
                            line.lot_number.as_deref(),
                        );
                        let live = balance_quantity(txn, &key).await?;
                        let delta = line.physical_quantity - live;

                        // Refresh the line so the stored figures reflect
                        // what actually posted.
                        StockAdjustmentLine::update_many()
                            .set(stock_adjustment_lines::ActiveModel {
                                previous_quantity: Set(live),
                                adjustment_quantity: Set(delta),
                                new_quantity: Set(line.physical_quantity),
                                updated_at: Set(now),
                                ..Default::default()
                            })
                            .filter(stock_adjustment_lines::Column::Id.eq(line.id))
                            .exec(txn)
                            .await?;

                        movements.push(StockMovement {
                            key,
                            quantity_delta: delta,
                        });
                    }

                    let document = DocumentRef {
                        document_type: DocumentType::StockAdjustment,
                        document_id: id,
                    };
                    let applied =
                        posting::apply_movements(txn, &document, transaction_id, movements)
                            .await?;

                    let header = StockAdjustmentHeader::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("stock adjustment {} not found", id))
                        })?;
                    let lines = StockAdjustmentLine::find()
                        .filter(stock_adjustment_lines::Column::AdjustmentHeaderId.eq(id))
                        .order_by_asc(stock_adjustment_lines::Column::Id)
                        .all(txn)
                        .await?;

                    Ok((StockAdjustment { header, lines }, applied))
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        info!(adjustment_id = id, %transaction_id, "stock adjustment posted");
        self.event_sender
            .send(Event::StockAdjustmentPosted {
                adjustment_id: id,
                transaction_id,
            })
            .await
            .map_err(ServiceError::EventError)?;
        super::notify_stock_levels(&self.event_sender, applied).await?;

        Ok(posted)
    }

    /// Cancels a draft or approved adjustment.
    #[instrument(skip(self))]
    pub async fn cancel(&self, id: i64) -> Result<StockAdjustment, ServiceError> {
        let existing = self.get(id).await?;
        if !existing
            .header
            .status
            .can_transition(&AdjustmentStatus::Cancelled)
        {
            return Err(ServiceError::InvalidState(format!(
                "stock adjustment {} is {:?} and cannot be cancelled",
                id, existing.header.status
            )));
        }

        let result = StockAdjustmentHeader::update_many()
            .set(stock_adjustment_headers::ActiveModel {
                status: Set(AdjustmentStatus::Cancelled),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(stock_adjustment_headers::Column::Id.eq(id))
            .filter(stock_adjustment_headers::Column::Status.is_in([
                AdjustmentStatus::Draft,
                AdjustmentStatus::Approved,
            ]))
            .exec(self.db_pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::InvalidState(format!(
                "stock adjustment {} is already terminal",
                id
            )));
        }

        self.get(id).await
    }

    pub async fn get(&self, id: i64) -> Result<StockAdjustment, ServiceError> {
        let db = self.db_pool.as_ref();
        let header = StockAdjustmentHeader::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("stock adjustment {} not found", id)))?;
        let lines = StockAdjustmentLine::find()
            .filter(stock_adjustment_lines::Column::AdjustmentHeaderId.eq(id))
            .order_by_asc(stock_adjustment_lines::Column::Id)
            .all(db)
            .await?;
        Ok(StockAdjustment { header, lines })
    }

    pub async fn list(
        &self,
        page: u64,
        per_page: u64,
        status: Option<AdjustmentStatus>,
    ) -> Result<(Vec<stock_adjustment_headers::Model>, u64), ServiceError> {
        let mut query = StockAdjustmentHeader::find();
        if let Some(status) = status {
            query = query.filter(stock_adjustment_headers::Column::Status.eq(status));
        }
        let paginator = query
            .order_by_desc(stock_adjustment_headers::Column::Id)
            .paginate(self.db_pool.as_ref(), per_page);
        let total = paginator.num_items().await?;
        let headers = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((headers, total))
    }
}
