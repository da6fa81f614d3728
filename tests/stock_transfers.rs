mod common;

use assert_matches::assert_matches;
use common::{date, seed_stock, spawn_app, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use warehouse_api::{
    entities::{stock_ledger::DocumentType, stock_transfer_headers::TransferStatus},
    errors::ServiceError,
    services::{
        posting::BalanceKey,
        stock_balances::LedgerFilter,
        stock_transfers::{
            CreateStockTransferInput, StockTransferLineInput, TransferReceiptInput,
        },
    },
};

fn transfer_input(app: &TestApp, quantity: Decimal) -> CreateStockTransferInput {
    CreateStockTransferInput {
        from_warehouse_id: app.seed.warehouse_a,
        to_warehouse_id: app.seed.warehouse_b,
        transfer_date: date("2024-07-10"),
        lines: vec![StockTransferLineInput {
            item_id: app.seed.item_bolt,
            from_location_id: app.seed.loc_a_storage,
            to_location_id: app.seed.loc_b_storage,
            lot_number: None,
            quantity,
            unit_cost: dec!(2),
        }],
    }
}

async fn balance(app: &TestApp, warehouse_id: i64, location_id: i64) -> Decimal {
    app.services
        .stock_balances
        .quantity(&BalanceKey::new(
            app.seed.item_bolt,
            warehouse_id,
            location_id,
            None,
        ))
        .await
        .expect("read balance")
}

#[tokio::test]
async fn transfer_requires_distinct_warehouses() {
    let app = spawn_app().await;
    let mut input = transfer_input(&app, dec!(10));
    input.to_warehouse_id = input.from_warehouse_id;

    let err = app.services.stock_transfers.create(input).await.unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn posting_conserves_total_stock() {
    let app = spawn_app().await;
    seed_stock(&app, app.seed.warehouse_a, app.seed.loc_a_storage, app.seed.item_bolt, dec!(50)).await;

    let transfer = app
        .services
        .stock_transfers
        .create(transfer_input(&app, dec!(20)))
        .await
        .expect("create transfer");
    let posted = app
        .services
        .stock_transfers
        .post(transfer.header.id)
        .await
        .expect("post transfer");
    assert_eq!(posted.header.status, TransferStatus::Posted);

    assert_eq!(balance(&app, app.seed.warehouse_a, app.seed.loc_a_storage).await, dec!(30));
    assert_eq!(balance(&app, app.seed.warehouse_b, app.seed.loc_b_storage).await, dec!(20));

    // Debit and credit share one transaction id.
    let (entries, total) = app
        .services
        .stock_balances
        .list_ledger(
            LedgerFilter {
                document_type: Some(DocumentType::StockTransfer),
                ..Default::default()
            },
            1,
            10,
        )
        .await
        .expect("list transfer ledger");
    assert_eq!(total, 2);
    assert_eq!(entries[0].transaction_id, entries[1].transaction_id);
    let deltas: Decimal = entries.iter().map(|e| e.quantity_delta).sum();
    assert_eq!(deltas, dec!(0));
}

#[tokio::test]
async fn insufficient_source_stock_rolls_back_everything() {
    let app = spawn_app().await;
    seed_stock(&app, app.seed.warehouse_a, app.seed.loc_a_storage, app.seed.item_bolt, dec!(50)).await;

    let transfer = app
        .services
        .stock_transfers
        .create(transfer_input(&app, dec!(60)))
        .await
        .expect("create transfer");
    let err = app
        .services
        .stock_transfers
        .post(transfer.header.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    // Balances and status are untouched; no ledger rows were kept.
    assert_eq!(balance(&app, app.seed.warehouse_a, app.seed.loc_a_storage).await, dec!(50));
    assert_eq!(balance(&app, app.seed.warehouse_b, app.seed.loc_b_storage).await, dec!(0));
    let reloaded = app
        .services
        .stock_transfers
        .get(transfer.header.id)
        .await
        .expect("reload transfer");
    assert_eq!(reloaded.header.status, TransferStatus::Draft);

    let (_, total) = app
        .services
        .stock_balances
        .list_ledger(
            LedgerFilter {
                document_type: Some(DocumentType::StockTransfer),
                ..Default::default()
            },
            1,
            10,
        )
        .await
        .expect("list transfer ledger");
    assert_eq!(total, 0);
}

#[tokio::test]
async fn partial_receipt_credits_received_quantity_only() {
    let app = spawn_app().await;
    seed_stock(&app, app.seed.warehouse_a, app.seed.loc_a_storage, app.seed.item_bolt, dec!(50)).await;

    let transfer = app
        .services
        .stock_transfers
        .create(transfer_input(&app, dec!(20)))
        .await
        .expect("create transfer");
    app.services
        .stock_transfers
        .approve(transfer.header.id)
        .await
        .expect("approve transfer");
    app.services
        .stock_transfers
        .ship(transfer.header.id)
        .await
        .expect("ship transfer");
    app.services
        .stock_transfers
        .receive(
            transfer.header.id,
            vec![TransferReceiptInput {
                transfer_line_id: transfer.lines[0].id,
                received_quantity: dec!(15),
            }],
        )
        .await
        .expect("receive transfer");

    app.services
        .stock_transfers
        .post(transfer.header.id)
        .await
        .expect("post transfer");

    // Source loses the full shipped quantity; the 5 in-transit units are
    // not credited anywhere.
    assert_eq!(balance(&app, app.seed.warehouse_a, app.seed.loc_a_storage).await, dec!(30));
    assert_eq!(balance(&app, app.seed.warehouse_b, app.seed.loc_b_storage).await, dec!(15));
}

#[tokio::test]
async fn received_quantity_cannot_exceed_shipped() {
    let app = spawn_app().await;
    seed_stock(&app, app.seed.warehouse_a, app.seed.loc_a_storage, app.seed.item_bolt, dec!(50)).await;

    let transfer = app
        .services
        .stock_transfers
        .create(transfer_input(&app, dec!(20)))
        .await
        .expect("create transfer");
    app.services
        .stock_transfers
        .approve(transfer.header.id)
        .await
        .expect("approve transfer");
    app.services
        .stock_transfers
        .ship(transfer.header.id)
        .await
        .expect("ship transfer");

    let err = app
        .services
        .stock_transfers
        .receive(
            transfer.header.id,
            vec![TransferReceiptInput {
                transfer_line_id: transfer.lines[0].id,
                received_quantity: dec!(25),
            }],
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn lifecycle_moves_forward_only() {
    let app = spawn_app().await;
    seed_stock(&app, app.seed.warehouse_a, app.seed.loc_a_storage, app.seed.item_bolt, dec!(50)).await;

    let transfer = app
        .services
        .stock_transfers
        .create(transfer_input(&app, dec!(10)))
        .await
        .expect("create transfer");

    // Shipping requires approval first.
    let err = app.services.stock_transfers.ship(transfer.header.id).await.unwrap_err();
    assert_matches!(err, ServiceError::InvalidState(_));

    app.services
        .stock_transfers
        .post(transfer.header.id)
        .await
        .expect("draft transfers may post directly");

    let err = app
        .services
        .stock_transfers
        .cancel(transfer.header.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidState(_));

    let err = app
        .services
        .stock_transfers
        .post(transfer.header.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::AlreadyPosted(_));
}
