mod common;

use assert_matches::assert_matches;
use common::{date, spawn_app, spawn_app_with, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use warehouse_api::{
    entities::goods_receipt_headers::OverallQcStatus,
    errors::ServiceError,
    services::{
        goods_receipts::{CreateGoodsReceiptInput, GoodsReceiptLineInput, QcAssessment},
        posting::BalanceKey,
        purchase_orders::{CreatePurchaseOrderInput, PurchaseOrderLineInput},
        stock_balances::LedgerFilter,
    },
};

/// Creates and approves a purchase order for 100 bolts at 10 each.
async fn approved_po(app: &TestApp) -> (i64, i64) {
    let po = app
        .services
        .purchase_orders
        .create(CreatePurchaseOrderInput {
            supplier_id: app.seed.supplier_id,
            warehouse_id: app.seed.warehouse_a,
            order_date: date("2024-06-10"),
            expected_delivery_date: None,
            notes: None,
            lines: vec![PurchaseOrderLineInput {
                item_id: app.seed.item_bolt,
                quantity: dec!(100),
                unit_price: dec!(10),
                tax_rate: dec!(0),
                discount_rate: dec!(0),
            }],
        })
        .await
        .expect("create purchase order");
    app.services
        .purchase_orders
        .approve(po.header.id, "alice".to_string())
        .await
        .expect("approve purchase order");
    (po.header.id, po.lines[0].id)
}

fn receipt_input(app: &TestApp, po_id: i64, po_line_id: i64, quantity: Decimal) -> CreateGoodsReceiptInput {
    CreateGoodsReceiptInput {
        po_header_id: po_id,
        receipt_date: date("2024-06-15"),
        notes: None,
        lines: vec![GoodsReceiptLineInput {
            po_line_id,
            location_id: app.seed.loc_a_receiving,
            quantity,
            lot_number: Some("LOT-1".to_string()),
            manufacture_date: None,
            expiry_date: None,
        }],
    }
}

async fn bolt_balance(app: &TestApp, location_id: i64, lot: Option<&str>) -> Decimal {
    app.services
        .stock_balances
        .quantity(&BalanceKey::new(
            app.seed.item_bolt,
            app.seed.warehouse_a,
            location_id,
            lot,
        ))
        .await
        .expect("read balance")
}

#[tokio::test]
async fn receipt_requires_approved_order() {
    let app = spawn_app().await;
    let po = app
        .services
        .purchase_orders
        .create(CreatePurchaseOrderInput {
            supplier_id: app.seed.supplier_id,
            warehouse_id: app.seed.warehouse_a,
            order_date: date("2024-06-10"),
            expected_delivery_date: None,
            notes: None,
            lines: vec![PurchaseOrderLineInput {
                item_id: app.seed.item_bolt,
                quantity: dec!(10),
                unit_price: dec!(1),
                tax_rate: dec!(0),
                discount_rate: dec!(0),
            }],
        })
        .await
        .expect("create purchase order");

    let err = app
        .services
        .goods_receipts
        .create(receipt_input(&app, po.header.id, po.lines[0].id, dec!(5)))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidState(_));
}

#[tokio::test]
async fn receivable_cap_counts_open_receipts() {
    let app = spawn_app().await;
    let (po_id, po_line_id) = approved_po(&app).await;

    app.services
        .goods_receipts
        .create(receipt_input(&app, po_id, po_line_id, dec!(60)))
        .await
        .expect("first receipt of 60");

    // 60 of 100 are claimed by the open receipt; 50 more must be refused.
    let err = app
        .services
        .goods_receipts
        .create(receipt_input(&app, po_id, po_line_id, dec!(50)))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::QuantityExceedsRemaining(_));

    app.services
        .goods_receipts
        .create(receipt_input(&app, po_id, po_line_id, dec!(40)))
        .await
        .expect("second receipt of 40");
}

#[tokio::test]
async fn qc_split_must_match_received_quantity() {
    let app = spawn_app().await;
    let (po_id, po_line_id) = approved_po(&app).await;
    let grn = app
        .services
        .goods_receipts
        .create(receipt_input(&app, po_id, po_line_id, dec!(60)))
        .await
        .expect("create receipt");

    let err = app
        .services
        .goods_receipts
        .record_qc(
            grn.header.id,
            vec![QcAssessment {
                grn_line_id: grn.lines[0].id,
                accepted_quantity: dec!(50),
                rejected_quantity: dec!(5),
                qc_notes: None,
            }],
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn posting_requires_completed_assessment() {
    let app = spawn_app().await;
    let (po_id, po_line_id) = approved_po(&app).await;
    let grn = app
        .services
        .goods_receipts
        .create(receipt_input(&app, po_id, po_line_id, dec!(60)))
        .await
        .expect("create receipt");

    let err = app.services.goods_receipts.post(grn.header.id).await.unwrap_err();
    assert_matches!(err, ServiceError::InvalidState(_));
    assert_eq!(bolt_balance(&app, app.seed.loc_a_receiving, Some("LOT-1")).await, dec!(0));
}

#[tokio::test]
async fn posting_credits_accepted_and_consumes_order() {
    let app = spawn_app().await;
    let (po_id, po_line_id) = approved_po(&app).await;
    let grn = app
        .services
        .goods_receipts
        .create(receipt_input(&app, po_id, po_line_id, dec!(60)))
        .await
        .expect("create receipt");

    let assessed = app
        .services
        .goods_receipts
        .record_qc(
            grn.header.id,
            vec![QcAssessment {
                grn_line_id: grn.lines[0].id,
                accepted_quantity: dec!(55),
                rejected_quantity: dec!(5),
                qc_notes: Some("edge damage on 5".to_string()),
            }],
        )
        .await
        .expect("record qc");
    assert_eq!(assessed.header.overall_qc_status, OverallQcStatus::Conditional);

    let posted = app
        .services
        .goods_receipts
        .post(grn.header.id)
        .await
        .expect("post receipt");
    assert!(posted.header.posted);

    // Accepted quantity lands at the receiving location; rejected stock is
    // dropped under the default policy.
    assert_eq!(
        bolt_balance(&app, app.seed.loc_a_receiving, Some("LOT-1")).await,
        dec!(55)
    );
    assert_eq!(
        bolt_balance(&app, app.seed.loc_a_quarantine, Some("LOT-1")).await,
        dec!(0)
    );

    // The full received quantity counts against the order line.
    let po = app.services.purchase_orders.get(po_id).await.expect("get po");
    assert_eq!(po.lines[0].received_quantity, dec!(60));

    let (entries, total) = app
        .services
        .stock_balances
        .list_ledger(LedgerFilter::default(), 1, 10)
        .await
        .expect("list ledger");
    assert_eq!(total, 1);
    assert_eq!(entries[0].quantity_delta, dec!(55));
    assert_eq!(entries[0].balance_after, dec!(55));
}

#[tokio::test]
async fn rejected_stock_goes_to_quarantine_when_enabled() {
    let app = spawn_app_with(|cfg| {
        cfg.inventory.post_rejected_to_quarantine = true;
    })
    .await;
    let (po_id, po_line_id) = approved_po(&app).await;
    let grn = app
        .services
        .goods_receipts
        .create(receipt_input(&app, po_id, po_line_id, dec!(60)))
        .await
        .expect("create receipt");

    app.services
        .goods_receipts
        .record_qc(
            grn.header.id,
            vec![QcAssessment {
                grn_line_id: grn.lines[0].id,
                accepted_quantity: dec!(55),
                rejected_quantity: dec!(5),
                qc_notes: None,
            }],
        )
        .await
        .expect("record qc");
    app.services
        .goods_receipts
        .post(grn.header.id)
        .await
        .expect("post receipt");

    assert_eq!(
        bolt_balance(&app, app.seed.loc_a_receiving, Some("LOT-1")).await,
        dec!(55)
    );
    assert_eq!(
        bolt_balance(&app, app.seed.loc_a_quarantine, Some("LOT-1")).await,
        dec!(5)
    );
}

#[tokio::test]
async fn double_post_is_rejected_and_balances_unchanged() {
    let app = spawn_app().await;
    let (po_id, po_line_id) = approved_po(&app).await;
    let grn = app
        .services
        .goods_receipts
        .create(receipt_input(&app, po_id, po_line_id, dec!(60)))
        .await
        .expect("create receipt");
    app.services
        .goods_receipts
        .record_qc(
            grn.header.id,
            vec![QcAssessment {
                grn_line_id: grn.lines[0].id,
                accepted_quantity: dec!(60),
                rejected_quantity: dec!(0),
                qc_notes: None,
            }],
        )
        .await
        .expect("record qc");
    app.services
        .goods_receipts
        .post(grn.header.id)
        .await
        .expect("first post");

    let err = app.services.goods_receipts.post(grn.header.id).await.unwrap_err();
    assert_matches!(err, ServiceError::AlreadyPosted(_));

    assert_eq!(
        bolt_balance(&app, app.seed.loc_a_receiving, Some("LOT-1")).await,
        dec!(60)
    );
    let po = app.services.purchase_orders.get(po_id).await.expect("get po");
    assert_eq!(po.lines[0].received_quantity, dec!(60));

    let (_, ledger_total) = app
        .services
        .stock_balances
        .list_ledger(LedgerFilter::default(), 1, 10)
        .await
        .expect("list ledger");
    assert_eq!(ledger_total, 1);
}

#[tokio::test]
async fn concurrent_posts_have_one_winner() {
    let app = spawn_app().await;
    let (po_id, po_line_id) = approved_po(&app).await;
    let grn = app
        .services
        .goods_receipts
        .create(receipt_input(&app, po_id, po_line_id, dec!(60)))
        .await
        .expect("create receipt");
    app.services
        .goods_receipts
        .record_qc(
            grn.header.id,
            vec![QcAssessment {
                grn_line_id: grn.lines[0].id,
                accepted_quantity: dec!(60),
                rejected_quantity: dec!(0),
                qc_notes: None,
            }],
        )
        .await
        .expect("record qc");

    let (a, b) = tokio::join!(
        app.services.goods_receipts.post(grn.header.id),
        app.services.goods_receipts.post(grn.header.id),
    );
    assert_eq!(
        a.is_ok() as u8 + b.is_ok() as u8,
        1,
        "exactly one post must win"
    );

    assert_eq!(
        bolt_balance(&app, app.seed.loc_a_receiving, Some("LOT-1")).await,
        dec!(60)
    );
}
