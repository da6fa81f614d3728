//! Posting coordinator: the single write path into the stock balance store
//! and the stock ledger.
//!
//! Every posting producer (goods receipt, stock adjustment, stock transfer)
//! opens a database transaction, flips its header status with a conditional
//! update so concurrent posts resolve to one winner, and then hands its
//! movement set to [`apply_movements`]. A posting call is all-or-nothing:
//! if any movement fails, the caller's transaction rolls back and no
//! balance or ledger mutation is retained.

use crate::{
    entities::{
        stock_balances::{self, Entity as StockBalance},
        stock_ledger::{self, DocumentType},
    },
    errors::ServiceError,
};
use chrono::Utc;
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tracing::info;
use uuid::Uuid;

lazy_static! {
    static ref STOCK_POSTINGS: IntCounterVec = register_int_counter_vec!(
        "stock_postings_total",
        "Total posted stock documents by document type",
        &["document_type"]
    )
    .expect("metric can be created");
    static ref STOCK_POSTING_FAILURES: IntCounterVec = register_int_counter_vec!(
        "stock_posting_failures_total",
        "Total failed stock postings by error type",
        &["error_type"]
    )
    .expect("metric can be created");
}

/// Identity of one stock balance row.
///
/// The ordering is the canonical lock-acquisition order: movement sets are
/// sorted by key before application so two postings touching the same keys
/// always visit them in the same sequence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BalanceKey {
    pub item_id: i64,
    pub warehouse_id: i64,
    pub location_id: i64,
    pub lot_number: String,
}

impl BalanceKey {
    pub fn new(item_id: i64, warehouse_id: i64, location_id: i64, lot: Option<&str>) -> Self {
        Self {
            item_id,
            warehouse_id,
            location_id,
            lot_number: lot.unwrap_or("").to_string(),
        }
    }
}

/// One signed quantity movement against a balance key.
#[derive(Debug, Clone)]
pub struct StockMovement {
    pub key: BalanceKey,
    pub quantity_delta: Decimal,
}

/// The document a posting originates from, recorded on every ledger entry.
#[derive(Debug, Clone)]
pub struct DocumentRef {
    pub document_type: DocumentType,
    pub document_id: i64,
}

/// Outcome of one applied movement.
#[derive(Debug, Clone)]
pub struct AppliedMovement {
    pub key: BalanceKey,
    pub quantity_delta: Decimal,
    pub balance_after: Decimal,
}

/// Applies a movement set to the balance store and appends matching ledger
/// entries, all within the caller's transaction.
///
/// Balance rows are updated under an optimistic version check; a conflict
/// aborts the posting with `ConcurrentModification` and the caller may
/// resubmit. A decrement that would drive a balance negative aborts with
/// `InsufficientStock`.
pub async fn apply_movements<C: ConnectionTrait>(
    txn: &C,
    document: &DocumentRef,
    transaction_id: Uuid,
    mut movements: Vec<StockMovement>,
) -> Result<Vec<AppliedMovement>, ServiceError> {
    movements.sort_by(|a, b| a.key.cmp(&b.key));

    let mut applied = Vec::with_capacity(movements.len());
    for movement in movements {
        if movement.quantity_delta.is_zero() {
            continue;
        }
        let balance_after = apply_one(txn, &movement).await.map_err(|e| {
            let label = match &e {
                ServiceError::InsufficientStock(_) => "insufficient_stock",
                ServiceError::ConcurrentModification(_) => "concurrent_modification",
                _ => "other",
            };
            STOCK_POSTING_FAILURES.with_label_values(&[label]).inc();
            e
        })?;

        let entry = stock_ledger::ActiveModel {
            id: Set(Uuid::new_v4()),
            transaction_id: Set(transaction_id),
            document_type: Set(document.document_type.clone()),
            document_id: Set(document.document_id),
            item_id: Set(movement.key.item_id),
            warehouse_id: Set(movement.key.warehouse_id),
            location_id: Set(movement.key.location_id),
            lot_number: Set(movement.key.lot_number.clone()),
            quantity_delta: Set(movement.quantity_delta),
            balance_after: Set(balance_after),
            posted_at: Set(Utc::now()),
        };
        entry.insert(txn).await?;

        applied.push(AppliedMovement {
            key: movement.key,
            quantity_delta: movement.quantity_delta,
            balance_after,
        });
    }

    STOCK_POSTINGS
        .with_label_values(&[document.document_type.to_string().as_str()])
        .inc();
    info!(
        document_type = %document.document_type,
        document_id = document.document_id,
        %transaction_id,
        movements = applied.len(),
        "stock movements applied"
    );

    Ok(applied)
}

/// Read-modify-write of a single balance row under the version check.
async fn apply_one<C: ConnectionTrait>(
    txn: &C,
    movement: &StockMovement,
) -> Result<Decimal, ServiceError> {
    let key = &movement.key;
    let existing = StockBalance::find()
        .filter(stock_balances::Column::ItemId.eq(key.item_id))
        .filter(stock_balances::Column::WarehouseId.eq(key.warehouse_id))
        .filter(stock_balances::Column::LocationId.eq(key.location_id))
        .filter(stock_balances::Column::LotNumber.eq(key.lot_number.clone()))
        .one(txn)
        .await?;

    match existing {
        Some(balance) => {
            let new_quantity = balance.quantity_on_hand + movement.quantity_delta;
            if new_quantity < Decimal::ZERO {
                return Err(ServiceError::InsufficientStock(format!(
                    "item {} at warehouse {} location {} has {} on hand, movement of {} would go negative",
                    key.item_id,
                    key.warehouse_id,
                    key.location_id,
                    balance.quantity_on_hand,
                    movement.quantity_delta
                )));
            }

            let result = StockBalance::update_many()
                .set(stock_balances::ActiveModel {
                    quantity_on_hand: Set(new_quantity),
                    version: Set(balance.version + 1),
                    updated_at: Set(Utc::now()),
                    ..Default::default()
                })
                .filter(stock_balances::Column::Id.eq(balance.id))
                .filter(stock_balances::Column::Version.eq(balance.version))
                .exec(txn)
                .await?;

            if result.rows_affected == 0 {
                return Err(ServiceError::ConcurrentModification(format!(
                    "stock balance for item {} at location {} changed during posting",
                    key.item_id, key.location_id
                )));
            }

            Ok(new_quantity)
        }
        None => {
            if movement.quantity_delta < Decimal::ZERO {
                return Err(ServiceError::InsufficientStock(format!(
                    "no stock of item {} at warehouse {} location {}",
                    key.item_id, key.warehouse_id, key.location_id
                )));
            }

            let now = Utc::now();
            stock_balances::ActiveModel {
                item_id: Set(key.item_id),
                warehouse_id: Set(key.warehouse_id),
                location_id: Set(key.location_id),
                lot_number: Set(key.lot_number.clone()),
                quantity_on_hand: Set(movement.quantity_delta),
                version: Set(0),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(txn)
            .await?;

            Ok(movement.quantity_delta)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn balance_keys_sort_canonically() {
        let mut keys = vec![
            BalanceKey::new(2, 1, 1, None),
            BalanceKey::new(1, 2, 1, None),
            BalanceKey::new(1, 1, 2, Some("LOT-B")),
            BalanceKey::new(1, 1, 2, Some("LOT-A")),
        ];
        keys.sort();
        assert_eq!(keys[0], BalanceKey::new(1, 1, 2, Some("LOT-A")));
        assert_eq!(keys[1], BalanceKey::new(1, 1, 2, Some("LOT-B")));
        assert_eq!(keys[2], BalanceKey::new(1, 2, 1, None));
        assert_eq!(keys[3], BalanceKey::new(2, 1, 1, None));
    }

    #[test]
    fn zero_delta_movements_are_skipped() {
        let movement = StockMovement {
            key: BalanceKey::new(1, 1, 1, None),
            quantity_delta: dec!(0),
        };
        assert!(movement.quantity_delta.is_zero());
    }
}
