mod common;

use axum::{
    body::{self, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use common::spawn_app;
use serde_json::{json, Value};
use tower::ServiceExt;
use warehouse_api::{app_router, AppState};

async fn router() -> (Router, common::TestApp) {
    let app = spawn_app().await;
    let state = AppState {
        services: app.services.clone(),
    };
    (app_router(state), app)
}

async fn send_json(router: &Router, method: Method, uri: &str, payload: Option<Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match payload {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let request = builder.body(body).expect("build request");
    router.clone().oneshot(request).await.expect("send request")
}

async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

#[tokio::test]
async fn health_endpoint_responds() {
    let (router, _app) = router().await;
    let response = send_json(&router, Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn supplier_crud_over_http() {
    let (router, _app) = router().await;

    let response = send_json(
        &router,
        Method::POST,
        "/api/v1/suppliers",
        Some(json!({"code": "SUP-HTTP", "name": "HTTP Supplier"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = response_json(response).await;
    let id = created["id"].as_i64().expect("supplier id");

    let response = send_json(
        &router,
        Method::GET,
        &format!("/api/v1/suppliers/{}", id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = response_json(response).await;
    assert_eq!(fetched["code"], "SUP-HTTP");
}

#[tokio::test]
async fn list_endpoints_tolerate_zero_page_size() {
    let (router, _app) = router().await;

    let response = send_json(
        &router,
        Method::GET,
        "/api/v1/suppliers?page=0&per_page=0",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["pagination"]["per_page"], 1);
    assert!(body["pagination"]["total"].as_u64().expect("total") >= 1);
}

#[tokio::test]
async fn purchase_order_validation_errors_map_to_http_statuses() {
    let (router, app) = router().await;

    // No lines: rejected by input validation.
    let response = send_json(
        &router,
        Method::POST,
        "/api/v1/purchase-orders",
        Some(json!({
            "supplier_id": app.seed.supplier_id,
            "warehouse_id": app.seed.warehouse_a,
            "order_date": "2024-06-10",
            "lines": []
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown supplier: fails closed with 404.
    let response = send_json(
        &router,
        Method::POST,
        "/api/v1/purchase-orders",
        Some(json!({
            "supplier_id": 9999,
            "warehouse_id": app.seed.warehouse_a,
            "order_date": "2024-06-10",
            "lines": [{"item_id": app.seed.item_bolt, "quantity": "1", "unit_price": "1"}]
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn missing_document_returns_not_found() {
    let (router, _app) = router().await;
    let response = send_json(&router, Method::GET, "/api/v1/goods-receipts/42", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stock_queries_paginate() {
    let (router, _app) = router().await;
    let response = send_json(
        &router,
        Method::GET,
        "/api/v1/stock/balances?page=1&per_page=5",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["data"].as_array().expect("data array").len(), 0);
}
