pub mod common;
pub mod goods_receipts;
pub mod master_data;
pub mod purchase_orders;
pub mod stock_adjustments;
pub mod stock_balances;
pub mod stock_transfers;

use crate::{
    config::AppConfig,
    db::DbPool,
    events::EventSender,
    services::{
        goods_receipts::GoodsReceiptService, master_data::MasterDataService,
        purchase_orders::PurchaseOrderService, stock_adjustments::StockAdjustmentService,
        stock_balances::StockBalanceService, stock_transfers::StockTransferService,
    },
};
use axum::{routing::get, Router};
use std::sync::Arc;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub master_data: MasterDataService,
    pub purchase_orders: PurchaseOrderService,
    pub goods_receipts: GoodsReceiptService,
    pub stock_adjustments: StockAdjustmentService,
    pub stock_transfers: StockTransferService,
    pub stock_balances: StockBalanceService,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, config: &AppConfig) -> Self {
        let purchase_orders = PurchaseOrderService::new(db_pool.clone(), event_sender.clone());
        let goods_receipts = GoodsReceiptService::new(
            db_pool.clone(),
            event_sender.clone(),
            purchase_orders.clone(),
            config.inventory.clone(),
        );
        let stock_adjustments = StockAdjustmentService::new(
            db_pool.clone(),
            event_sender.clone(),
            config.inventory.clone(),
        );
        let stock_transfers = StockTransferService::new(db_pool.clone(), event_sender);
        let stock_balances = StockBalanceService::new(db_pool.clone());
        let master_data = MasterDataService::new(db_pool);

        Self {
            master_data,
            purchase_orders,
            goods_receipts,
            stock_adjustments,
            stock_transfers,
            stock_balances,
        }
    }
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub services: AppServices,
}

async fn health() -> &'static str {
    "OK"
}

/// Builds the `/api/v1` router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/suppliers", master_data::supplier_routes())
        .nest("/warehouses", master_data::warehouse_routes())
        .nest("/items", master_data::item_routes())
        .nest("/purchase-orders", purchase_orders::routes())
        .nest("/goods-receipts", goods_receipts::routes())
        .nest("/stock-adjustments", stock_adjustments::routes())
        .nest("/stock-transfers", stock_transfers::routes())
        .nest("/stock", stock_balances::routes())
}

/// Top-level application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .with_state(state)
}
