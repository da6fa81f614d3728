mod common;

use assert_matches::assert_matches;
use common::{date, seed_stock, spawn_app, spawn_app_with, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use warehouse_api::{
    entities::stock_adjustment_headers::{AdjustmentStatus, AdjustmentType},
    errors::ServiceError,
    services::{
        posting::BalanceKey,
        stock_adjustments::{CreateStockAdjustmentInput, StockAdjustmentLineInput},
    },
};

fn count_input(app: &TestApp, physical: Decimal) -> CreateStockAdjustmentInput {
    CreateStockAdjustmentInput {
        warehouse_id: app.seed.warehouse_a,
        adjustment_date: date("2024-07-01"),
        adjustment_type: AdjustmentType::PhysicalCount,
        reason: "monthly count".to_string(),
        lines: vec![StockAdjustmentLineInput {
            item_id: app.seed.item_bolt,
            location_id: app.seed.loc_a_storage,
            lot_number: None,
            physical_quantity: physical,
            unit_cost: dec!(2),
        }],
    }
}

async fn bolt_balance(app: &TestApp) -> Decimal {
    app.services
        .stock_balances
        .quantity(&BalanceKey::new(
            app.seed.item_bolt,
            app.seed.warehouse_a,
            app.seed.loc_a_storage,
            None,
        ))
        .await
        .expect("read balance")
}

#[tokio::test]
async fn draft_snapshots_previous_quantity() {
    let app = spawn_app().await;
    seed_stock(&app, app.seed.warehouse_a, app.seed.loc_a_storage, app.seed.item_bolt, dec!(50)).await;

    let adjustment = app
        .services
        .stock_adjustments
        .create(count_input(&app, dec!(80)))
        .await
        .expect("create adjustment");

    assert_eq!(adjustment.header.status, AdjustmentStatus::Draft);
    assert_eq!(adjustment.lines[0].previous_quantity, dec!(50));
    assert_eq!(adjustment.lines[0].adjustment_quantity, dec!(30));
    assert_eq!(adjustment.lines[0].new_quantity, dec!(80));
    // Drafting never touches the balance.
    assert_eq!(bolt_balance(&app).await, dec!(50));
}

#[tokio::test]
async fn posting_reconciles_against_live_balance() {
    let app = spawn_app().await;
    seed_stock(&app, app.seed.warehouse_a, app.seed.loc_a_storage, app.seed.item_bolt, dec!(50)).await;

    // Draft against a balance of 50.
    let stale = app
        .services
        .stock_adjustments
        .create(count_input(&app, dec!(80)))
        .await
        .expect("create first adjustment");

    // Another adjustment moves the balance to 60 before the first posts.
    let interim = app
        .services
        .stock_adjustments
        .create(count_input(&app, dec!(60)))
        .await
        .expect("create interim adjustment");
    app.services
        .stock_adjustments
        .post(interim.header.id)
        .await
        .expect("post interim adjustment");
    assert_eq!(bolt_balance(&app).await, dec!(60));

    // The declared count of 80 is authoritative: the movement is recomputed
    // from the live balance, not the draft-time snapshot.
    let posted = app
        .services
        .stock_adjustments
        .post(stale.header.id)
        .await
        .expect("post stale adjustment");
    assert_eq!(posted.lines[0].previous_quantity, dec!(60));
    assert_eq!(posted.lines[0].adjustment_quantity, dec!(20));
    assert_eq!(posted.lines[0].new_quantity, dec!(80));
    assert_eq!(bolt_balance(&app).await, dec!(80));
}

#[tokio::test]
async fn count_matching_balance_posts_without_movement() {
    let app = spawn_app().await;
    seed_stock(&app, app.seed.warehouse_a, app.seed.loc_a_storage, app.seed.item_bolt, dec!(50)).await;

    let adjustment = app
        .services
        .stock_adjustments
        .create(count_input(&app, dec!(50)))
        .await
        .expect("create adjustment");
    let posted = app
        .services
        .stock_adjustments
        .post(adjustment.header.id)
        .await
        .expect("post adjustment");

    assert_eq!(posted.header.status, AdjustmentStatus::Posted);
    assert_eq!(posted.lines[0].adjustment_quantity, dec!(0));
    assert_eq!(bolt_balance(&app).await, dec!(50));
}

#[tokio::test]
async fn double_post_is_rejected() {
    let app = spawn_app().await;
    let adjustment = app
        .services
        .stock_adjustments
        .create(count_input(&app, dec!(10)))
        .await
        .expect("create adjustment");
    app.services
        .stock_adjustments
        .post(adjustment.header.id)
        .await
        .expect("first post");

    let err = app
        .services
        .stock_adjustments
        .post(adjustment.header.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::AlreadyPosted(_));
    assert_eq!(bolt_balance(&app).await, dec!(10));
}

#[tokio::test]
async fn approval_gate_is_configurable() {
    let app = spawn_app_with(|cfg| {
        cfg.inventory.require_adjustment_approval = true;
    })
    .await;

    let adjustment = app
        .services
        .stock_adjustments
        .create(count_input(&app, dec!(10)))
        .await
        .expect("create adjustment");

    let err = app
        .services
        .stock_adjustments
        .post(adjustment.header.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidState(_));

    app.services
        .stock_adjustments
        .approve(adjustment.header.id, "carol".to_string())
        .await
        .expect("approve adjustment");
    let posted = app
        .services
        .stock_adjustments
        .post(adjustment.header.id)
        .await
        .expect("post after approval");
    assert_eq!(posted.header.status, AdjustmentStatus::Posted);
}

#[tokio::test]
async fn cancelled_adjustment_cannot_post() {
    let app = spawn_app().await;
    let adjustment = app
        .services
        .stock_adjustments
        .create(count_input(&app, dec!(10)))
        .await
        .expect("create adjustment");
    app.services
        .stock_adjustments
        .cancel(adjustment.header.id)
        .await
        .expect("cancel adjustment");

    let err = app
        .services
        .stock_adjustments
        .post(adjustment.header.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidState(_));
    assert_eq!(bolt_balance(&app).await, dec!(0));
}
