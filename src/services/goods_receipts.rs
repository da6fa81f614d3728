use crate::{
    config::InventoryConfig,
    db::DbPool,
    entities::{
        goods_receipt_headers::{self, Entity as GoodsReceiptHeader, OverallQcStatus},
        goods_receipt_lines::{self, Entity as GoodsReceiptLine, LineQcStatus},
        purchase_order_headers::PurchaseOrderStatus,
        purchase_order_lines,
        stock_ledger::DocumentType,
        warehouse_locations::{self, Entity as WarehouseLocation, LocationKind},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        posting::{self, AppliedMovement, BalanceKey, DocumentRef, StockMovement},
        purchase_orders::{flatten_transaction_error, PurchaseOrderService},
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

/// A goods receipt header together with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct GoodsReceipt {
    pub header: goods_receipt_headers::Model,
    pub lines: Vec<goods_receipt_lines::Model>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoodsReceiptLineInput {
    pub po_line_id: i64,
    pub location_id: i64,
    pub quantity: Decimal,
    pub lot_number: Option<String>,
    pub manufacture_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGoodsReceiptInput {
    pub po_header_id: i64,
    pub receipt_date: NaiveDate,
    pub notes: Option<String>,
    pub lines: Vec<GoodsReceiptLineInput>,
}

/// One line's quality-control assessment.
#[derive(Debug, Clone, Deserialize)]
pub struct QcAssessment {
    pub grn_line_id: i64,
    pub accepted_quantity: Decimal,
    pub rejected_quantity: Decimal,
    pub qc_notes: Option<String>,
}

/// Derives a line's QC status from its accepted/rejected split.
pub fn line_qc_status(accepted: Decimal, rejected: Decimal) -> LineQcStatus {
    if rejected.is_zero() {
        LineQcStatus::Pass
    } else if accepted.is_zero() {
        LineQcStatus::Fail
    } else {
        LineQcStatus::Partial
    }
}

/// Aggregates line outcomes into the header's overall status.
///
/// Any pending line keeps the receipt pending; a uniform outcome carries
/// through; any mix of acceptance and rejection is `Conditional`.
pub fn aggregate_qc_status(lines: &[LineQcStatus]) -> OverallQcStatus {
    if lines.is_empty() || lines.iter().any(|s| *s == LineQcStatus::Pending) {
        return OverallQcStatus::Pending;
    }
    let all_pass = lines.iter().all(|s| *s == LineQcStatus::Pass);
    let all_fail = lines.iter().all(|s| *s == LineQcStatus::Fail);
    if all_pass {
        OverallQcStatus::Pass
    } else if all_fail {
        OverallQcStatus::Fail
    } else {
        OverallQcStatus::Conditional
    }
}

/// Service for goods receipt notes: receiving against approved purchase
/// orders, quality control, and posting accepted stock.
#[derive(Clone)]
pub struct GoodsReceiptService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
    po_service: PurchaseOrderService,
    inventory: InventoryConfig,
}

impl GoodsReceiptService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: EventSender,
        po_service: PurchaseOrderService,
        inventory: InventoryConfig,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            po_service,
            inventory,
        }
    }

    /// Creates a receipt against an approved purchase order.
    ///
    /// The receivable cap is enforced per purchase order line: ordered
    /// quantity minus already-received quantity minus quantities claimed by
    /// other receipts not yet posted, counting earlier lines of this same
    /// request against the cap as well.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateGoodsReceiptInput) -> Result<GoodsReceipt, ServiceError> {
        if input.lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "a goods receipt requires at least one line".to_string(),
            ));
        }

        let po = self.po_service.get(input.po_header_id).await?;
        if po.header.status != PurchaseOrderStatus::Approved {
            return Err(ServiceError::InvalidState(format!(
                "purchase order {} is {:?}, receipts require an Approved order",
                po.header.id, po.header.status
            )));
        }

        let po_lines: HashMap<i64, &purchase_order_lines::Model> =
            po.lines.iter().map(|l| (l.id, l)).collect();

        let db = self.db_pool.as_ref();
        let mut claimed: HashMap<i64, Decimal> = HashMap::new();
        for (idx, line) in input.lines.iter().enumerate() {
            if line.quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "line {}: quantity must be positive",
                    idx + 1
                )));
            }
            let po_line = po_lines.get(&line.po_line_id).ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "line {}: purchase order line {} does not belong to order {}",
                    idx + 1,
                    line.po_line_id,
                    po.header.id
                ))
            })?;

            let location = WarehouseLocation::find_by_id(line.location_id)
                .one(db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("location {} not found", line.location_id))
                })?;
            if location.warehouse_id != po.header.warehouse_id {
                return Err(ServiceError::ValidationError(format!(
                    "line {}: location {} is not in warehouse {}",
                    idx + 1,
                    line.location_id,
                    po.header.warehouse_id
                )));
            }

            let open_claims = self.open_receipt_claims(line.po_line_id).await?;
            let prior = claimed.get(&line.po_line_id).copied().unwrap_or_default();
            let receivable = po_line.remaining_quantity() - open_claims - prior;
            if line.quantity > receivable {
                return Err(ServiceError::QuantityExceedsRemaining(format!(
                    "line {}: purchase order line {} has {} receivable, requested {}",
                    idx + 1,
                    line.po_line_id,
                    receivable.max(Decimal::ZERO),
                    line.quantity
                )));
            }
            *claimed.entry(line.po_line_id).or_default() += line.quantity;
        }

        // Owned per-line context for the transaction closure.
        let line_context: Vec<(i64, Decimal)> = input
            .lines
            .iter()
            .map(|line| {
                let po_line = po_lines[&line.po_line_id];
                (po_line.item_id, po_line.unit_price)
            })
            .collect();

        let now = Utc::now();
        let grn_number = super::document_number("GRN");
        let warehouse_id = po.header.warehouse_id;

        let created = self
            .db_pool
            .transaction::<_, GoodsReceipt, ServiceError>(move |txn| {
                Box::pin(async move {
                    let header = goods_receipt_headers::ActiveModel {
                        grn_number: Set(grn_number),
                        po_header_id: Set(input.po_header_id),
                        warehouse_id: Set(warehouse_id),
                        receipt_date: Set(input.receipt_date),
                        overall_qc_status: Set(OverallQcStatus::Pending),
                        posted: Set(false),
                        posted_at: Set(None),
                        notes: Set(input.notes.clone()),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    let mut lines = Vec::with_capacity(input.lines.len());
                    for (line, (item_id, unit_cost)) in input.lines.iter().zip(line_context) {
                        let model = goods_receipt_lines::ActiveModel {
                            grn_header_id: Set(header.id),
                            po_line_id: Set(line.po_line_id),
                            item_id: Set(item_id),
                            location_id: Set(line.location_id),
                            quantity: Set(line.quantity),
                            unit_cost: Set(unit_cost),
                            lot_number: Set(line.lot_number.clone()),
                            manufacture_date: Set(line.manufacture_date),
                            expiry_date: Set(line.expiry_date),
                            accepted_quantity: Set(Decimal::ZERO),
                            rejected_quantity: Set(Decimal::ZERO),
                            qc_status: Set(LineQcStatus::Pending),
                            qc_notes: Set(None),
                            created_at: Set(now),
                            updated_at: Set(now),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await?;
                        lines.push(model);
                    }

                    Ok(GoodsReceipt { header, lines })
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        info!(
            grn_id = created.header.id,
            po_id = created.header.po_header_id,
            "goods receipt created"
        );
        self.event_sender
            .send(Event::GoodsReceiptCreated {
                grn_id: created.header.id,
                po_id: created.header.po_header_id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    /// Sum of quantities on receipt lines for this purchase order line
    /// whose receipts have not posted yet.
    async fn open_receipt_claims(&self, po_line_id: i64) -> Result<Decimal, ServiceError> {
        let rows = GoodsReceiptLine::find()
            .filter(goods_receipt_lines::Column::PoLineId.eq(po_line_id))
            .find_also_related(GoodsReceiptHeader)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(rows
            .into_iter()
            .filter(|(_, header)| header.as_ref().map(|h| !h.posted).unwrap_or(false))
            .map(|(line, _)| line.quantity)
            .sum())
    }

    /// Records QC results for a set of lines and re-derives the header's
    /// overall status. Rejected on posted receipts.
    #[instrument(skip(self, assessments))]
    pub async fn record_qc(
        &self,
        grn_id: i64,
        assessments: Vec<QcAssessment>,
    ) -> Result<GoodsReceipt, ServiceError> {
        let receipt = self.get(grn_id).await?;
        if receipt.header.posted {
            return Err(ServiceError::InvalidState(format!(
                "goods receipt {} is posted and can no longer be assessed",
                grn_id
            )));
        }

        let line_ids: HashMap<i64, &goods_receipt_lines::Model> =
            receipt.lines.iter().map(|l| (l.id, l)).collect();
        for assessment in &assessments {
            let line = line_ids.get(&assessment.grn_line_id).ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "line {} does not belong to goods receipt {}",
                    assessment.grn_line_id, grn_id
                ))
            })?;
            if assessment.accepted_quantity < Decimal::ZERO
                || assessment.rejected_quantity < Decimal::ZERO
            {
                return Err(ServiceError::ValidationError(format!(
                    "line {}: accepted and rejected quantities must not be negative",
                    assessment.grn_line_id
                )));
            }
            if assessment.accepted_quantity + assessment.rejected_quantity != line.quantity {
                return Err(ServiceError::ValidationError(format!(
                    "line {}: accepted {} + rejected {} must equal received quantity {}",
                    assessment.grn_line_id,
                    assessment.accepted_quantity,
                    assessment.rejected_quantity,
                    line.quantity
                )));
            }
        }

        let now = Utc::now();
        let updated = self
            .db_pool
            .transaction::<_, GoodsReceipt, ServiceError>(move |txn| {
                Box::pin(async move {
                    for assessment in &assessments {
                        let status = line_qc_status(
                            assessment.accepted_quantity,
                            assessment.rejected_quantity,
                        );
                        GoodsReceiptLine::update_many()
                            .set(goods_receipt_lines::ActiveModel {
                                accepted_quantity: Set(assessment.accepted_quantity),
                                rejected_quantity: Set(assessment.rejected_quantity),
                                qc_status: Set(status),
                                qc_notes: Set(assessment.qc_notes.clone()),
                                updated_at: Set(now),
                                ..Default::default()
                            })
                            .filter(goods_receipt_lines::Column::Id.eq(assessment.grn_line_id))
                            .exec(txn)
                            .await?;
                    }

                    let lines = GoodsReceiptLine::find()
                        .filter(goods_receipt_lines::Column::GrnHeaderId.eq(grn_id))
                        .order_by_asc(goods_receipt_lines::Column::Id)
                        .all(txn)
                        .await?;
                    let overall =
                        aggregate_qc_status(&lines.iter().map(|l| l.qc_status.clone()).collect::<Vec<_>>());

                    let result = GoodsReceiptHeader::update_many()
                        .set(goods_receipt_headers::ActiveModel {
                            overall_qc_status: Set(overall.clone()),
                            updated_at: Set(now),
                            ..Default::default()
                        })
                        .filter(goods_receipt_headers::Column::Id.eq(grn_id))
                        .filter(goods_receipt_headers::Column::Posted.eq(false))
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Err(ServiceError::InvalidState(format!(
                            "goods receipt {} was posted during assessment",
                            grn_id
                        )));
                    }

                    let header = GoodsReceiptHeader::find_by_id(grn_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("goods receipt {} not found", grn_id))
                        })?;

                    Ok(GoodsReceipt { header, lines })
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        self.event_sender
            .send(Event::GoodsReceiptQcRecorded {
                grn_id,
                overall_status: format!("{:?}", updated.header.overall_qc_status),
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// Posts the receipt: credits accepted stock at each line's location,
    /// optionally moves rejected stock into quarantine, and consumes the
    /// purchase order's receivable remainder.
    ///
    /// Posting requires a completed assessment; `Pending` receipts are
    /// rejected. Only one post of a receipt can ever succeed.
    #[instrument(skip(self))]
    pub async fn post(&self, grn_id: i64) -> Result<GoodsReceipt, ServiceError> {
        let receipt = self.get(grn_id).await?;
        if receipt.header.posted {
            return Err(ServiceError::AlreadyPosted(format!(
                "goods receipt {} is already posted",
                grn_id
            )));
        }
        if receipt.header.overall_qc_status == OverallQcStatus::Pending {
            return Err(ServiceError::InvalidState(format!(
                "goods receipt {} has a pending quality assessment",
                grn_id
            )));
        }

        let quarantine_location = if self.inventory.post_rejected_to_quarantine
            && receipt
                .lines
                .iter()
                .any(|l| l.rejected_quantity > Decimal::ZERO)
        {
            let location = WarehouseLocation::find()
                .filter(warehouse_locations::Column::WarehouseId.eq(receipt.header.warehouse_id))
                .filter(warehouse_locations::Column::Kind.eq(LocationKind::Quarantine))
                .one(self.db_pool.as_ref())
                .await?
                .ok_or_else(|| {
                    ServiceError::ValidationError(format!(
                        "warehouse {} has no quarantine location",
                        receipt.header.warehouse_id
                    ))
                })?;
            Some(location.id)
        } else {
            None
        };

        let transaction_id = Uuid::new_v4();
        let po_service = self.po_service.clone();
        let warehouse_id = receipt.header.warehouse_id;
        let po_header_id = receipt.header.po_header_id;
        let lines = receipt.lines.clone();
        let now = Utc::now();

        let (posted, applied) = self
            .db_pool
            .transaction::<_, (GoodsReceipt, Vec<AppliedMovement>), ServiceError>(move |txn| {
                Box::pin(async move {
                    // One winner: the posted flag flips exactly once.
                    let result = GoodsReceiptHeader::update_many()
                        .set(goods_receipt_headers::ActiveModel {
                            posted: Set(true),
                            posted_at: Set(Some(now)),
                            updated_at: Set(now),
                            ..Default::default()
                        })
                        .filter(goods_receipt_headers::Column::Id.eq(grn_id))
                        .filter(goods_receipt_headers::Column::Posted.eq(false))
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Err(ServiceError::AlreadyPosted(format!(
                            "goods receipt {} is already posted",
                            grn_id
                        )));
                    }

                    let mut movements = Vec::new();
                    for line in &lines {
                        if line.accepted_quantity > Decimal::ZERO {
                            movements.push(StockMovement {
                                key: BalanceKey::new(
                                    line.item_id,
                                    warehouse_id,
                                    line.location_id,
                                    line.lot_number.as_deref(),
                                ),
                                quantity_delta: line.accepted_quantity,
                            });
                        }
                        if line.rejected_quantity > Decimal::ZERO {
                            if let Some(quarantine_id) = quarantine_location {
                                movements.push(StockMovement {
                                    key: BalanceKey::new(
                                        line.item_id,
                                        warehouse_id,
                                        quarantine_id,
                                        line.lot_number.as_deref(),
                                    ),
                                    quantity_delta: line.rejected_quantity,
                                });
                            }
                        }
                        // The full received quantity counts against the
                        // order, rejections included.
                        po_service
                            .increment_received(txn, line.po_line_id, line.quantity)
                            .await?;
                    }

                    let document = DocumentRef {
                        document_type: DocumentType::GoodsReceipt,
                        document_id: grn_id,
                    };
                    let applied =
                        posting::apply_movements(txn, &document, transaction_id, movements)
                            .await?;

                    let header = GoodsReceiptHeader::find_by_id(grn_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("goods receipt {} not found", grn_id))
                        })?;
                    let lines = GoodsReceiptLine::find()
                        .filter(goods_receipt_lines::Column::GrnHeaderId.eq(grn_id))
                        .order_by_asc(goods_receipt_lines::Column::Id)
                        .all(txn)
                        .await?;

                    Ok((GoodsReceipt { header, lines }, applied))
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        info!(grn_id, po_id = po_header_id, %transaction_id, "goods receipt posted");
        self.event_sender
            .send(Event::GoodsReceiptPosted {
                grn_id,
                po_id: po_header_id,
                transaction_id,
            })
            .await
            .map_err(ServiceError::EventError)?;
        super::notify_stock_levels(&self.event_sender, applied).await?;

        Ok(posted)
    }

    pub async fn get(&self, grn_id: i64) -> Result<GoodsReceipt, ServiceError> {
        let db = self.db_pool.as_ref();
        let header = GoodsReceiptHeader::find_by_id(grn_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("goods receipt {} not found", grn_id)))?;
        let lines = GoodsReceiptLine::find()
            .filter(goods_receipt_lines::Column::GrnHeaderId.eq(grn_id))
            .order_by_asc(goods_receipt_lines::Column::Id)
            .all(db)
            .await?;
        Ok(GoodsReceipt { header, lines })
    }

    pub async fn list(
        &self,
        page: u64,
        per_page: u64,
        po_header_id: Option<i64>,
    ) -> Result<(Vec<goods_receipt_headers::Model>, u64), ServiceError> {
        let mut query = GoodsReceiptHeader::find();
        if let Some(po_id) = po_header_id {
            query = query.filter(goods_receipt_headers::Column::PoHeaderId.eq(po_id));
        }
        let paginator = query
            .order_by_desc(goods_receipt_headers::Column::Id)
            .paginate(self.db_pool.as_ref(), per_page);
        let total = paginator.num_items().await?;
        let headers = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((headers, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn line_status_from_split() {
        assert_eq!(line_qc_status(dec!(10), dec!(0)), LineQcStatus::Pass);
        assert_eq!(line_qc_status(dec!(0), dec!(10)), LineQcStatus::Fail);
        assert_eq!(line_qc_status(dec!(7), dec!(3)), LineQcStatus::Partial);
    }

    #[test]
    fn overall_status_aggregation() {
        use LineQcStatus::*;
        assert_eq!(aggregate_qc_status(&[Pass, Pass]), OverallQcStatus::Pass);
        assert_eq!(aggregate_qc_status(&[Fail, Fail]), OverallQcStatus::Fail);
        assert_eq!(
            aggregate_qc_status(&[Pass, Fail]),
            OverallQcStatus::Conditional
        );
        assert_eq!(
            aggregate_qc_status(&[Pass, Partial]),
            OverallQcStatus::Conditional
        );
        assert_eq!(
            aggregate_qc_status(&[Pass, Pending]),
            OverallQcStatus::Pending
        );
        assert_eq!(aggregate_qc_status(&[]), OverallQcStatus::Pending);
    }
}
