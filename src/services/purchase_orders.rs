use crate::{
    db::DbPool,
    entities::{
        items::Entity as Item,
        purchase_order_headers::{self, Entity as PurchaseOrderHeader, PurchaseOrderStatus},
        purchase_order_lines::{self, Entity as PurchaseOrderLine},
        suppliers::Entity as Supplier,
        warehouses::Entity as Warehouse,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// A purchase order header together with its ordered lines.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOrder {
    pub header: purchase_order_headers::Model,
    pub lines: Vec<purchase_order_lines::Model>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseOrderLineInput {
    pub item_id: i64,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub tax_rate: Decimal,
    #[serde(default)]
    pub discount_rate: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePurchaseOrderInput {
    pub supplier_id: i64,
    pub warehouse_id: i64,
    pub order_date: NaiveDate,
    pub expected_delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub lines: Vec<PurchaseOrderLineInput>,
}

/// Line total: `quantity × unit_price × (1 + tax/100) × (1 − discount/100)`.
pub fn line_total(
    quantity: Decimal,
    unit_price: Decimal,
    tax_rate: Decimal,
    discount_rate: Decimal,
) -> Decimal {
    let gross = quantity * unit_price;
    gross * (Decimal::ONE + tax_rate / Decimal::ONE_HUNDRED)
        * (Decimal::ONE - discount_rate / Decimal::ONE_HUNDRED)
}

/// Derived header totals; never independently edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax_total: Decimal,
    pub discount_total: Decimal,
    pub total: Decimal,
}

pub fn order_totals(lines: &[PurchaseOrderLineInput]) -> OrderTotals {
    let mut totals = OrderTotals {
        subtotal: Decimal::ZERO,
        tax_total: Decimal::ZERO,
        discount_total: Decimal::ZERO,
        total: Decimal::ZERO,
    };
    for line in lines {
        let gross = line.quantity * line.unit_price;
        let taxed = gross * (Decimal::ONE + line.tax_rate / Decimal::ONE_HUNDRED);
        totals.subtotal += gross;
        totals.tax_total += gross * line.tax_rate / Decimal::ONE_HUNDRED;
        totals.discount_total += taxed * line.discount_rate / Decimal::ONE_HUNDRED;
        totals.total += line_total(
            line.quantity,
            line.unit_price,
            line.tax_rate,
            line.discount_rate,
        );
    }
    totals
}

/// Service for the purchase order lifecycle.
#[derive(Clone)]
pub struct PurchaseOrderService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl PurchaseOrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    fn validate_lines(lines: &[PurchaseOrderLineInput]) -> Result<(), ServiceError> {
        if lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "a purchase order requires at least one line".to_string(),
            ));
        }
        for (idx, line) in lines.iter().enumerate() {
            if line.quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "line {}: quantity must be positive",
                    idx + 1
                )));
            }
            if line.unit_price < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "line {}: unit price must not be negative",
                    idx + 1
                )));
            }
            for (name, rate) in [("tax", line.tax_rate), ("discount", line.discount_rate)] {
                if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
                    return Err(ServiceError::ValidationError(format!(
                        "line {}: {} rate must be between 0 and 100",
                        idx + 1,
                        name
                    )));
                }
            }
        }
        Ok(())
    }

    async fn check_references(&self, input: &CreatePurchaseOrderInput) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        Supplier::find_by_id(input.supplier_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("supplier {} not found", input.supplier_id))
            })?;
        Warehouse::find_by_id(input.warehouse_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("warehouse {} not found", input.warehouse_id))
            })?;
        for line in &input.lines {
            Item::find_by_id(line.item_id).one(db).await?.ok_or_else(|| {
                ServiceError::NotFound(format!("item {} not found", line.item_id))
            })?;
        }
        Ok(())
    }

    /// Creates a purchase order in `Draft` with computed totals.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreatePurchaseOrderInput) -> Result<PurchaseOrder, ServiceError> {
        Self::validate_lines(&input.lines)?;
        self.check_references(&input).await?;

        let totals = order_totals(&input.lines);
        let now = Utc::now();
        let po_number = super::document_number("PO");

        let created = self
            .db_pool
            .transaction::<_, PurchaseOrder, ServiceError>(move |txn| {
                Box::pin(async move {
                    let header = purchase_order_headers::ActiveModel {
                        po_number: Set(po_number),
                        supplier_id: Set(input.supplier_id),
                        warehouse_id: Set(input.warehouse_id),
                        order_date: Set(input.order_date),
                        expected_delivery_date: Set(input.expected_delivery_date),
                        status: Set(PurchaseOrderStatus::Draft),
                        subtotal: Set(totals.subtotal),
                        tax_total: Set(totals.tax_total),
                        discount_total: Set(totals.discount_total),
                        total: Set(totals.total),
                        approved_by: Set(None),
                        approved_at: Set(None),
                        notes: Set(input.notes.clone()),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    let mut lines = Vec::with_capacity(input.lines.len());
                    for (idx, line) in input.lines.iter().enumerate() {
                        let model = purchase_order_lines::ActiveModel {
                            po_header_id: Set(header.id),
                            line_num: Set((idx + 1) as i32),
                            item_id: Set(line.item_id),
                            quantity: Set(line.quantity),
                            unit_price: Set(line.unit_price),
                            tax_rate: Set(line.tax_rate),
                            discount_rate: Set(line.discount_rate),
                            line_total: Set(line_total(
                                line.quantity,
                                line.unit_price,
                                line.tax_rate,
                                line.discount_rate,
                            )),
                            received_quantity: Set(Decimal::ZERO),
                            created_at: Set(now),
                            updated_at: Set(now),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await?;
                        lines.push(model);
                    }

                    Ok(PurchaseOrder { header, lines })
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        info!(po_id = created.header.id, po_number = %created.header.po_number, "purchase order created");
        self.event_sender
            .send(Event::PurchaseOrderCreated(created.header.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    /// Replaces header fields and lines. Only `Draft` orders are editable.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: i64,
        input: CreatePurchaseOrderInput,
    ) -> Result<PurchaseOrder, ServiceError> {
        Self::validate_lines(&input.lines)?;
        self.check_references(&input).await?;

        let existing = self.get(id).await?;
        if existing.header.status != PurchaseOrderStatus::Draft {
            return Err(ServiceError::InvalidState(format!(
                "purchase order {} is {:?}, only Draft orders can be updated",
                id, existing.header.status
            )));
        }

        let totals = order_totals(&input.lines);
        let now = Utc::now();

        let updated = self
            .db_pool
            .transaction::<_, PurchaseOrder, ServiceError>(move |txn| {
                Box::pin(async move {
                    let result = PurchaseOrderHeader::update_many()
                        .set(purchase_order_headers::ActiveModel {
                            supplier_id: Set(input.supplier_id),
                            warehouse_id: Set(input.warehouse_id),
                            order_date: Set(input.order_date),
                            expected_delivery_date: Set(input.expected_delivery_date),
                            subtotal: Set(totals.subtotal),
                            tax_total: Set(totals.tax_total),
                            discount_total: Set(totals.discount_total),
                            total: Set(totals.total),
                            notes: Set(input.notes.clone()),
                            updated_at: Set(now),
                            ..Default::default()
                        })
                        .filter(purchase_order_headers::Column::Id.eq(id))
                        .filter(
                            purchase_order_headers::Column::Status
                                .eq(PurchaseOrderStatus::Draft),
                        )
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Err(ServiceError::InvalidState(format!(
                            "purchase order {} left Draft during update",
                            id
                        )));
                    }

                    PurchaseOrderLine::delete_many()
                        .filter(purchase_order_lines::Column::PoHeaderId.eq(id))
                        .exec(txn)
                        .await?;

                    let mut lines = Vec::with_capacity(input.lines.len());
                    for (idx, line) in input.lines.iter().enumerate() {
                        let model = purchase_order_lines::ActiveModel {
                            po_header_id: Set(id),
                            line_num: Set((idx + 1) as i32),
                            item_id: Set(line.item_id),
                            quantity: Set(line.quantity),
                            unit_price: Set(line.unit_price),
                            tax_rate: Set(line.tax_rate),
                            discount_rate: Set(line.discount_rate),
                            line_total: Set(line_total(
                                line.quantity,
                                line.unit_price,
                                line.tax_rate,
                                line.discount_rate,
                            )),
                            received_quantity: Set(Decimal::ZERO),
                            created_at: Set(now),
                            updated_at: Set(now),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await?;
                        lines.push(model);
                    }

                    let header = PurchaseOrderHeader::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("purchase order {} not found", id))
                        })?;

                    Ok(PurchaseOrder { header, lines })
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        self.event_sender
            .send(Event::PurchaseOrderUpdated(id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// Approves a `Draft` order, stamping approver and time. A concurrent
    /// approve resolves to one winner; the loser sees `InvalidState`.
    #[instrument(skip(self))]
    pub async fn approve(&self, id: i64, approved_by: String) -> Result<PurchaseOrder, ServiceError> {
        let existing = self.get(id).await?;
        if !existing
            .header
            .status
            .can_transition(&PurchaseOrderStatus::Approved)
        {
            return Err(ServiceError::InvalidState(format!(
                "purchase order {} is {:?} and cannot be approved",
                id, existing.header.status
            )));
        }

        let now = Utc::now();
        let result = PurchaseOrderHeader::update_many()
            .set(purchase_order_headers::ActiveModel {
                status: Set(PurchaseOrderStatus::Approved),
                approved_by: Set(Some(approved_by.clone())),
                approved_at: Set(Some(now)),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(purchase_order_headers::Column::Id.eq(id))
            .filter(purchase_order_headers::Column::Status.eq(PurchaseOrderStatus::Draft))
            .exec(self.db_pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::InvalidState(format!(
                "purchase order {} is no longer Draft",
                id
            )));
        }

        info!(po_id = id, approved_by = %approved_by, "purchase order approved");
        self.event_sender
            .send(Event::PurchaseOrderApproved {
                po_id: id,
                approved_by,
            })
            .await
            .map_err(ServiceError::EventError)?;

        self.get(id).await
    }

    /// Cancels a `Draft` or `Approved` order. Posted receipts are not
    /// reversed; cancellation after partial receipt is a known limitation
    /// left to the caller.
    #[instrument(skip(self))]
    pub async fn cancel(&self, id: i64) -> Result<PurchaseOrder, ServiceError> {
        let existing = self.get(id).await?;
        if !existing
            .header
            .status
            .can_transition(&PurchaseOrderStatus::Cancelled)
        {
            return Err(ServiceError::InvalidState(format!(
                "purchase order {} is {:?} and cannot be cancelled",
                id, existing.header.status
            )));
        }

        let result = PurchaseOrderHeader::update_many()
            .set(purchase_order_headers::ActiveModel {
                status: Set(PurchaseOrderStatus::Cancelled),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(purchase_order_headers::Column::Id.eq(id))
            .filter(purchase_order_headers::Column::Status.is_in([
                PurchaseOrderStatus::Draft,
                PurchaseOrderStatus::Approved,
            ]))
            .exec(self.db_pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::InvalidState(format!(
                "purchase order {} is already terminal",
                id
            )));
        }

        self.event_sender
            .send(Event::PurchaseOrderCancelled(id))
            .await
            .map_err(ServiceError::EventError)?;

        self.get(id).await
    }

    /// Deletes a `Draft` order and its lines.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        if existing.header.status != PurchaseOrderStatus::Draft {
            return Err(ServiceError::InvalidState(format!(
                "purchase order {} is {:?}, only Draft orders can be deleted",
                id, existing.header.status
            )));
        }

        self.db_pool
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    let result = PurchaseOrderHeader::delete_many()
                        .filter(purchase_order_headers::Column::Id.eq(id))
                        .filter(
                            purchase_order_headers::Column::Status
                                .eq(PurchaseOrderStatus::Draft),
                        )
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Err(ServiceError::InvalidState(format!(
                            "purchase order {} left Draft during delete",
                            id
                        )));
                    }
                    PurchaseOrderLine::delete_many()
                        .filter(purchase_order_lines::Column::PoHeaderId.eq(id))
                        .exec(txn)
                        .await?;
                    Ok(())
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<PurchaseOrder, ServiceError> {
        let db = self.db_pool.as_ref();
        let header = PurchaseOrderHeader::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("purchase order {} not found", id)))?;
        let lines = PurchaseOrderLine::find()
            .filter(purchase_order_lines::Column::PoHeaderId.eq(id))
            .order_by_asc(purchase_order_lines::Column::LineNum)
            .all(db)
            .await?;
        Ok(PurchaseOrder { header, lines })
    }

    pub async fn list(
        &self,
        page: u64,
        per_page: u64,
        status: Option<PurchaseOrderStatus>,
    ) -> Result<(Vec<purchase_order_headers::Model>, u64), ServiceError> {
        let db = self.db_pool.as_ref();
        let mut query = PurchaseOrderHeader::find();
        if let Some(status) = status {
            query = query.filter(purchase_order_headers::Column::Status.eq(status));
        }
        let paginator = query
            .order_by_desc(purchase_order_headers::Column::Id)
            .paginate(db, per_page);
        let total = paginator.num_items().await?;
        let headers = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((headers, total))
    }

    /// The narrow capability goods receipt posting uses to consume the
    /// receivable remainder, inside the posting transaction. Guarded so
    /// `received_quantity` can never exceed the ordered quantity.
    pub async fn increment_received(
        &self,
        txn: &DatabaseTransaction,
        po_line_id: i64,
        quantity: Decimal,
    ) -> Result<(), ServiceError> {
        let line = PurchaseOrderLine::find_by_id(po_line_id)
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("purchase order line {} not found", po_line_id))
            })?;

        let new_received = line.received_quantity + quantity;
        if new_received > line.quantity {
            return Err(ServiceError::QuantityExceedsRemaining(format!(
                "purchase order line {} has {} remaining, cannot receive {}",
                po_line_id,
                line.remaining_quantity(),
                quantity
            )));
        }

        let result = PurchaseOrderLine::update_many()
            .set(purchase_order_lines::ActiveModel {
                received_quantity: Set(new_received),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(purchase_order_lines::Column::Id.eq(po_line_id))
            .filter(purchase_order_lines::Column::ReceivedQuantity.eq(line.received_quantity))
            .exec(txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::ConcurrentModification(format!(
                "purchase order line {} was received concurrently",
                po_line_id
            )));
        }

        Ok(())
    }
}

pub(crate) fn flatten_transaction_error(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
        TransactionError::Transaction(service_err) => service_err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(quantity: Decimal, price: Decimal, tax: Decimal, discount: Decimal) -> PurchaseOrderLineInput {
        PurchaseOrderLineInput {
            item_id: 1,
            quantity,
            unit_price: price,
            tax_rate: tax,
            discount_rate: discount,
        }
    }

    #[test]
    fn line_total_applies_tax_then_discount() {
        assert_eq!(line_total(dec!(100), dec!(10), dec!(10), dec!(0)), dec!(1100));
        assert_eq!(line_total(dec!(10), dec!(5), dec!(0), dec!(50)), dec!(25));
        assert_eq!(
            line_total(dec!(10), dec!(10), dec!(10), dec!(10)),
            dec!(99)
        );
    }

    #[test]
    fn header_totals_sum_over_lines() {
        let lines = vec![line(dec!(100), dec!(10), dec!(10), dec!(0))];
        let totals = order_totals(&lines);
        assert_eq!(totals.subtotal, dec!(1000));
        assert_eq!(totals.tax_total, dec!(100));
        assert_eq!(totals.discount_total, dec!(0));
        assert_eq!(totals.total, dec!(1100));
    }

    #[test]
    fn discount_is_taken_from_taxed_amount() {
        let lines = vec![line(dec!(10), dec!(10), dec!(10), dec!(10))];
        let totals = order_totals(&lines);
        assert_eq!(totals.subtotal, dec!(100));
        assert_eq!(totals.tax_total, dec!(10));
        assert_eq!(totals.discount_total, dec!(11));
        assert_eq!(totals.total, dec!(99));
    }
}
