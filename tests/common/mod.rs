#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tokio::sync::mpsc;
use warehouse_api::{
    config::AppConfig,
    db::DbPool,
    entities::{items::ItemType, warehouse_locations::LocationKind},
    events::{process_events, EventSender},
    handlers::AppServices,
    migrator::Migrator,
    services::stock_adjustments::{CreateStockAdjustmentInput, StockAdjustmentLineInput},
};
use warehouse_api::entities::stock_adjustment_headers::AdjustmentType;
use warehouse_api::services::master_data::{
    CreateItemInput, CreateLocationInput, CreateSupplierInput, CreateWarehouseInput,
};

/// Master data rows every test starts from.
pub struct Seed {
    pub supplier_id: i64,
    pub warehouse_a: i64,
    pub warehouse_b: i64,
    pub loc_a_storage: i64,
    pub loc_a_receiving: i64,
    pub loc_a_quarantine: i64,
    pub loc_b_storage: i64,
    pub item_bolt: i64,
    pub item_widget: i64,
}

pub struct TestApp {
    pub services: AppServices,
    pub db: Arc<DbPool>,
    pub seed: Seed,
}

/// In-memory sqlite app with default inventory policy.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// In-memory sqlite app with a tweaked configuration.
pub async fn spawn_app_with(tweak: impl FnOnce(&mut AppConfig)) -> TestApp {
    let mut cfg = AppConfig::new(
        "sqlite::memory:".to_string(),
        "127.0.0.1".to_string(),
        0,
        "test".to_string(),
    );
    tweak(&mut cfg);

    // A single connection keeps the in-memory database alive and shared.
    let mut opt = ConnectOptions::new(cfg.database_url.clone());
    opt.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.expect("connect to sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    let db = Arc::new(db);

    let (event_tx, event_rx) = mpsc::channel(1024);
    tokio::spawn(process_events(event_rx));
    let event_sender = EventSender::new(event_tx);

    let services = AppServices::new(db.clone(), event_sender, &cfg);
    let seed = seed_master_data(&services).await;

    TestApp { services, db, seed }
}

async fn seed_master_data(services: &AppServices) -> Seed {
    let supplier = services
        .master_data
        .create_supplier(CreateSupplierInput {
            code: "SUP-01".to_string(),
            name: "Acme Components".to_string(),
            contact_email: Some("orders@acme.test".to_string()),
            phone: None,
        })
        .await
        .expect("create supplier");

    let warehouse_a = services
        .master_data
        .create_warehouse(CreateWarehouseInput {
            code: "WH-A".to_string(),
            name: "Main warehouse".to_string(),
        })
        .await
        .expect("create warehouse A");
    let warehouse_b = services
        .master_data
        .create_warehouse(CreateWarehouseInput {
            code: "WH-B".to_string(),
            name: "Satellite warehouse".to_string(),
        })
        .await
        .expect("create warehouse B");

    let loc_a_storage = services
        .master_data
        .create_location(CreateLocationInput {
            warehouse_id: warehouse_a.id,
            code: "A-ST-01".to_string(),
            kind: LocationKind::Storage,
        })
        .await
        .expect("create storage location");
    let loc_a_receiving = services
        .master_data
        .create_location(CreateLocationInput {
            warehouse_id: warehouse_a.id,
            code: "A-RC-01".to_string(),
            kind: LocationKind::Receiving,
        })
        .await
        .expect("create receiving location");
    let loc_a_quarantine = services
        .master_data
        .create_location(CreateLocationInput {
            warehouse_id: warehouse_a.id,
            code: "A-QR-01".to_string(),
            kind: LocationKind::Quarantine,
        })
        .await
        .expect("create quarantine location");
    let loc_b_storage = services
        .master_data
        .create_location(CreateLocationInput {
            warehouse_id: warehouse_b.id,
            code: "B-ST-01".to_string(),
            kind: LocationKind::Storage,
        })
        .await
        .expect("create storage location B");

    let item_bolt = services
        .master_data
        .create_item(CreateItemInput {
            sku: "BOLT-M8".to_string(),
            name: "M8 bolt".to_string(),
            item_type: ItemType::Material,
            unit_of_measure: "EA".to_string(),
        })
        .await
        .expect("create bolt item");
    let item_widget = services
        .master_data
        .create_item(CreateItemInput {
            sku: "WIDGET-1".to_string(),
            name: "Widget".to_string(),
            item_type: ItemType::Product,
            unit_of_measure: "EA".to_string(),
        })
        .await
        .expect("create widget item");

    Seed {
        supplier_id: supplier.id,
        warehouse_a: warehouse_a.id,
        warehouse_b: warehouse_b.id,
        loc_a_storage: loc_a_storage.id,
        loc_a_receiving: loc_a_receiving.id,
        loc_a_quarantine: loc_a_quarantine.id,
        loc_b_storage: loc_b_storage.id,
        item_bolt: item_bolt.id,
        item_widget: item_widget.id,
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

/// Seeds stock by posting an initial-stock adjustment.
pub async fn seed_stock(
    app: &TestApp,
    warehouse_id: i64,
    location_id: i64,
    item_id: i64,
    quantity: Decimal,
) {
    let adjustment = app
        .services
        .stock_adjustments
        .create(CreateStockAdjustmentInput {
            warehouse_id,
            adjustment_date: date("2024-06-01"),
            adjustment_type: AdjustmentType::InitialStock,
            reason: "initial stock load".to_string(),
            lines: vec![StockAdjustmentLineInput {
                item_id,
                location_id,
                lot_number: None,
                physical_quantity: quantity,
                unit_cost: Decimal::ZERO,
            }],
        })
        .await
        .expect("create initial stock adjustment");
    app.services
        .stock_adjustments
        .approve(adjustment.header.id, "seed".to_string())
        .await
        .expect("approve initial stock adjustment");
    app.services
        .stock_adjustments
        .post(adjustment.header.id)
        .await
        .expect("post initial stock adjustment");
}
