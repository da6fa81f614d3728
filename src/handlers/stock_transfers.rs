use super::common::{
    created_response, success_response, validate_input, PaginatedResponse, PaginationParams,
};
use crate::{
    entities::stock_transfer_headers::TransferStatus,
    errors::ServiceError,
    handlers::AppState,
    services::stock_transfers::{
        CreateStockTransferInput, StockTransferLineInput, TransferReceiptInput,
    },
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Request DTOs

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct StockTransferLineRequest {
    pub item_id: i64,
    pub from_location_id: i64,
    pub to_location_id: i64,
    #[validate(length(max = 64))]
    pub lot_number: Option<String>,
    pub quantity: Decimal,
    #[serde(default)]
    pub unit_cost: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateStockTransferRequest {
    pub from_warehouse_id: i64,
    pub to_warehouse_id: i64,
    pub transfer_date: NaiveDate,
    #[validate(length(min = 1))]
    pub lines: Vec<StockTransferLineRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct TransferReceiptLineRequest {
    pub transfer_line_id: i64,
    pub received_quantity: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReceiveStockTransferRequest {
    #[validate(length(min = 1))]
    pub receipts: Vec<TransferReceiptLineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<TransferStatus>,
}

// Handler functions

/// Create a draft stock transfer
#[utoipa::path(
    post,
    path = "/api/v1/stock-transfers",
    request_body = CreateStockTransferRequest,
    responses(
        (status = 201, description = "Stock transfer created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "stock-transfers"
)]
pub async fn create_stock_transfer(
    State(state): State<AppState>,
    Json(payload): Json<CreateStockTransferRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let input = CreateStockTransferInput {
        from_warehouse_id: payload.from_warehouse_id,
        to_warehouse_id: payload.to_warehouse_id,
        transfer_date: payload.transfer_date,
        lines: payload
            .lines
            .into_iter()
            .map(|line| StockTransferLineInput {
                item_id: line.item_id,
                from_location_id: line.from_location_id,
                to_location_id: line.to_location_id,
                lot_number: line.lot_number,
                quantity: line.quantity,
                unit_cost: line.unit_cost,
            })
            .collect(),
    };
    let transfer = state.services.stock_transfers.create(input).await?;
    Ok(created_response(transfer))
}

/// Approve a draft stock transfer
#[utoipa::path(
    post,
    path = "/api/v1/stock-transfers/{id}/approve",
    params(("id" = i64, Path, description = "Stock transfer ID")),
    responses(
        (status = 200, description = "Stock transfer approved"),
        (status = 409, description = "Transfer cannot be approved", body = crate::errors::ErrorResponse)
    ),
    tag = "stock-transfers"
)]
pub async fn approve_stock_transfer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let transfer = state.services.stock_transfers.approve(id).await?;
    Ok(success_response(transfer))
}

/// Mark an approved stock transfer as shipped
#[utoipa::path(
    post,
    path = "/api/v1/stock-transfers/{id}/ship",
    params(("id" = i64, Path, description = "Stock transfer ID")),
    responses(
        (status = 200, description = "Stock transfer shipped"),
        (status = 409, description = "Transfer cannot be shipped", body = crate::errors::ErrorResponse)
    ),
    tag = "stock-transfers"
)]
pub async fn ship_stock_transfer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let transfer = state.services.stock_transfers.ship(id).await?;
    Ok(success_response(transfer))
}

/// Record receipt of a shipped stock transfer
#[utoipa::path(
    post,
    path = "/api/v1/stock-transfers/{id}/receive",
    request_body = ReceiveStockTransferRequest,
    params(("id" = i64, Path, description = "Stock transfer ID")),
    responses(
        (status = 200, description = "Stock transfer received"),
        (status = 400, description = "Received quantity out of range", body = crate::errors::ErrorResponse)
    ),
    tag = "stock-transfers"
)]
pub async fn receive_stock_transfer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ReceiveStockTransferRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let receipts = payload
        .receipts
        .into_iter()
        .map(|r| TransferReceiptInput {
            transfer_line_id: r.transfer_line_id,
            received_quantity: r.received_quantity,
        })
        .collect();
    let transfer = state.services.stock_transfers.receive(id, receipts).await?;
    Ok(success_response(transfer))
}

/// Post a stock transfer, moving balances between warehouses
#[utoipa::path(
    post,
    path = "/api/v1/stock-transfers/{id}/post",
    params(("id" = i64, Path, description = "Stock transfer ID")),
    responses(
        (status = 200, description = "Stock transfer posted"),
        (status = 409, description = "Already posted", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock at source", body = crate::errors::ErrorResponse)
    ),
    tag = "stock-transfers"
)]
pub async fn post_stock_transfer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let transfer = state.services.stock_transfers.post(id).await?;
    Ok(success_response(transfer))
}

/// Cancel a stock transfer
#[utoipa::path(
    post,
    path = "/api/v1/stock-transfers/{id}/cancel",
    params(("id" = i64, Path, description = "Stock transfer ID")),
    responses(
        (status = 200, description = "Stock transfer cancelled"),
        (status = 409, description = "Transfer is terminal", body = crate::errors::ErrorResponse)
    ),
    tag = "stock-transfers"
)]
pub async fn cancel_stock_transfer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let transfer = state.services.stock_transfers.cancel(id).await?;
    Ok(success_response(transfer))
}

/// Get a stock transfer with its lines
#[utoipa::path(
    get,
    path = "/api/v1/stock-transfers/{id}",
    params(("id" = i64, Path, description = "Stock transfer ID")),
    responses(
        (status = 200, description = "Stock transfer fetched"),
        (status = 404, description = "Stock transfer not found", body = crate::errors::ErrorResponse)
    ),
    tag = "stock-transfers"
)]
pub async fn get_stock_transfer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let transfer = state.services.stock_transfers.get(id).await?;
    Ok(success_response(transfer))
}

/// List stock transfers, optionally filtered by status
#[utoipa::path(
    get,
    path = "/api/v1/stock-transfers",
    responses((status = 200, description = "Stock transfers listed")),
    tag = "stock-transfers"
)]
pub async fn list_stock_transfers(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (headers, total) = state
        .services
        .stock_transfers
        .list(pagination.page, pagination.per_page, query.status)
        .await?;
    Ok(success_response(PaginatedResponse::new(
        headers,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Creates the router for stock transfer endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_stock_transfer).get(list_stock_transfers))
        .route("/:id", get(get_stock_transfer))
        .route("/:id/approve", post(approve_stock_transfer))
        .route("/:id/ship", post(ship_stock_transfer))
        .route("/:id/receive", post(receive_stock_transfer))
        .route("/:id/post", post(post_stock_transfer))
        .route("/:id/cancel", post(cancel_stock_transfer))
}
