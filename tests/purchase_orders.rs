mod common;

use assert_matches::assert_matches;
use common::{date, spawn_app};
use rust_decimal_macros::dec;
use warehouse_api::{
    entities::purchase_order_headers::PurchaseOrderStatus,
    errors::ServiceError,
    services::purchase_orders::{CreatePurchaseOrderInput, PurchaseOrderLineInput},
};

fn order_input(app: &common::TestApp, lines: Vec<PurchaseOrderLineInput>) -> CreatePurchaseOrderInput {
    CreatePurchaseOrderInput {
        supplier_id: app.seed.supplier_id,
        warehouse_id: app.seed.warehouse_a,
        order_date: date("2024-06-10"),
        expected_delivery_date: Some(date("2024-06-20")),
        notes: None,
        lines,
    }
}

#[tokio::test]
async fn create_computes_totals_from_lines() {
    let app = spawn_app().await;
    let po = app
        .services
        .purchase_orders
        .create(order_input(
            &app,
            vec![PurchaseOrderLineInput {
                item_id: app.seed.item_bolt,
                quantity: dec!(100),
                unit_price: dec!(10),
                tax_rate: dec!(10),
                discount_rate: dec!(0),
            }],
        ))
        .await
        .expect("create purchase order");

    assert_eq!(po.header.status, PurchaseOrderStatus::Draft);
    assert_eq!(po.header.subtotal, dec!(1000));
    assert_eq!(po.header.tax_total, dec!(100));
    assert_eq!(po.header.discount_total, dec!(0));
    assert_eq!(po.header.total, dec!(1100));
    assert_eq!(po.lines.len(), 1);
    assert_eq!(po.lines[0].line_total, dec!(1100));
    assert_eq!(po.lines[0].received_quantity, dec!(0));
    assert!(po.header.po_number.starts_with("PO-"));
}

#[tokio::test]
async fn create_rejects_empty_and_invalid_lines() {
    let app = spawn_app().await;

    let err = app
        .services
        .purchase_orders
        .create(order_input(&app, vec![]))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let err = app
        .services
        .purchase_orders
        .create(order_input(
            &app,
            vec![PurchaseOrderLineInput {
                item_id: app.seed.item_bolt,
                quantity: dec!(0),
                unit_price: dec!(10),
                tax_rate: dec!(0),
                discount_rate: dec!(0),
            }],
        ))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let err = app
        .services
        .purchase_orders
        .create(order_input(
            &app,
            vec![PurchaseOrderLineInput {
                item_id: app.seed.item_bolt,
                quantity: dec!(1),
                unit_price: dec!(10),
                tax_rate: dec!(120),
                discount_rate: dec!(0),
            }],
        ))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn create_fails_closed_on_unknown_references() {
    let app = spawn_app().await;
    let mut input = order_input(
        &app,
        vec![PurchaseOrderLineInput {
            item_id: app.seed.item_bolt,
            quantity: dec!(1),
            unit_price: dec!(1),
            tax_rate: dec!(0),
            discount_rate: dec!(0),
        }],
    );
    input.supplier_id = 9999;

    let err = app.services.purchase_orders.create(input).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn approve_stamps_approver_and_is_single_winner() {
    let app = spawn_app().await;
    let po = app
        .services
        .purchase_orders
        .create(order_input(
            &app,
            vec![PurchaseOrderLineInput {
                item_id: app.seed.item_bolt,
                quantity: dec!(10),
                unit_price: dec!(2),
                tax_rate: dec!(0),
                discount_rate: dec!(0),
            }],
        ))
        .await
        .expect("create purchase order");

    let approved = app
        .services
        .purchase_orders
        .approve(po.header.id, "alice".to_string())
        .await
        .expect("approve purchase order");
    assert_eq!(approved.header.status, PurchaseOrderStatus::Approved);
    assert_eq!(approved.header.approved_by.as_deref(), Some("alice"));
    assert!(approved.header.approved_at.is_some());

    let err = app
        .services
        .purchase_orders
        .approve(po.header.id, "bob".to_string())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidState(_));
}

#[tokio::test]
async fn update_and_delete_require_draft() {
    let app = spawn_app().await;
    let lines = vec![PurchaseOrderLineInput {
        item_id: app.seed.item_bolt,
        quantity: dec!(10),
        unit_price: dec!(2),
        tax_rate: dec!(0),
        discount_rate: dec!(0),
    }];
    let po = app
        .services
        .purchase_orders
        .create(order_input(&app, lines.clone()))
        .await
        .expect("create purchase order");
    app.services
        .purchase_orders
        .approve(po.header.id, "alice".to_string())
        .await
        .expect("approve purchase order");

    let err = app
        .services
        .purchase_orders
        .update(po.header.id, order_input(&app, lines))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidState(_));

    let err = app
        .services
        .purchase_orders
        .delete(po.header.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidState(_));
}

#[tokio::test]
async fn cancel_allows_draft_and_approved_only() {
    let app = spawn_app().await;
    let po = app
        .services
        .purchase_orders
        .create(order_input(
            &app,
            vec![PurchaseOrderLineInput {
                item_id: app.seed.item_widget,
                quantity: dec!(5),
                unit_price: dec!(3),
                tax_rate: dec!(0),
                discount_rate: dec!(0),
            }],
        ))
        .await
        .expect("create purchase order");

    let cancelled = app
        .services
        .purchase_orders
        .cancel(po.header.id)
        .await
        .expect("cancel purchase order");
    assert_eq!(cancelled.header.status, PurchaseOrderStatus::Cancelled);

    let err = app
        .services
        .purchase_orders
        .cancel(po.header.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidState(_));
}

#[tokio::test]
async fn list_filters_by_status() {
    let app = spawn_app().await;
    let lines = vec![PurchaseOrderLineInput {
        item_id: app.seed.item_bolt,
        quantity: dec!(1),
        unit_price: dec!(1),
        tax_rate: dec!(0),
        discount_rate: dec!(0),
    }];
    let first = app
        .services
        .purchase_orders
        .create(order_input(&app, lines.clone()))
        .await
        .expect("create first order");
    app.services
        .purchase_orders
        .create(order_input(&app, lines))
        .await
        .expect("create second order");
    app.services
        .purchase_orders
        .approve(first.header.id, "alice".to_string())
        .await
        .expect("approve first order");

    let (approved, total) = app
        .services
        .purchase_orders
        .list(1, 10, Some(PurchaseOrderStatus::Approved))
        .await
        .expect("list approved");
    assert_eq!(total, 1);
    assert_eq!(approved.len(), 1);
    assert_eq!(approved[0].id, first.header.id);

    let (_, all_total) = app
        .services
        .purchase_orders
        .list(1, 10, None)
        .await
        .expect("list all");
    assert_eq!(all_total, 2);
}
