pub mod goods_receipts;
pub mod master_data;
pub mod posting;
pub mod purchase_orders;
pub mod stock_adjustments;
pub mod stock_balances;
pub mod stock_transfers;

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
};
use uuid::Uuid;

/// Generates a document number such as `PO-1f3a9c2b`.
pub(crate) fn document_number(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &id[..8])
}

/// Publishes one `StockLevelChanged` event per applied movement, after the
/// posting transaction has committed.
pub(crate) async fn notify_stock_levels(
    sender: &EventSender,
    applied: Vec<posting::AppliedMovement>,
) -> Result<(), ServiceError> {
    for movement in applied {
        sender
            .send(Event::StockLevelChanged {
                item_id: movement.key.item_id,
                warehouse_id: movement.key.warehouse_id,
                location_id: movement.key.location_id,
                lot_number: movement.key.lot_number,
                quantity_delta: movement.quantity_delta,
                balance_after: movement.balance_after,
            })
            .await
            .map_err(ServiceError::EventError)?;
    }
    Ok(())
}
