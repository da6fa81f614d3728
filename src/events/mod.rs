use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

/// Events emitted by the document lifecycles and the posting paths.
///
/// Events are fired after a successful commit; delivery is best effort and
/// never blocks or rolls back the transaction that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Purchase order events
    PurchaseOrderCreated(i64),
    PurchaseOrderUpdated(i64),
    PurchaseOrderApproved {
        po_id: i64,
        approved_by: String,
    },
    PurchaseOrderCancelled(i64),

    // Goods receipt events
    GoodsReceiptCreated {
        grn_id: i64,
        po_id: i64,
    },
    GoodsReceiptQcRecorded {
        grn_id: i64,
        overall_status: String,
    },
    GoodsReceiptPosted {
        grn_id: i64,
        po_id: i64,
        transaction_id: Uuid,
    },

    // Stock adjustment events
    StockAdjustmentCreated(i64),
    StockAdjustmentPosted {
        adjustment_id: i64,
        transaction_id: Uuid,
    },

    // Stock transfer events
    StockTransferCreated(i64),
    StockTransferPosted {
        transfer_id: i64,
        transaction_id: Uuid,
    },

    // Balance change notification, one per applied movement
    StockLevelChanged {
        item_id: i64,
        warehouse_id: i64,
        location_id: i64,
        lot_number: String,
        quantity_delta: Decimal,
        balance_after: Decimal,
    },
}

/// Cloneable handle for publishing events onto the processing channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Consumes events from the channel. Today this logs them; downstream
/// integrations (webhooks, reporting feeds) subscribe here.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::GoodsReceiptPosted {
                grn_id,
                po_id,
                transaction_id,
            } => info!(
                grn_id,
                po_id,
                %transaction_id,
                "goods receipt posted"
            ),
            Event::StockAdjustmentPosted {
                adjustment_id,
                transaction_id,
            } => info!(adjustment_id, %transaction_id, "stock adjustment posted"),
            Event::StockTransferPosted {
                transfer_id,
                transaction_id,
            } => info!(transfer_id, %transaction_id, "stock transfer posted"),
            other => debug!(event = ?other, "event processed"),
        }
    }
    info!("Event processor stopped");
}
