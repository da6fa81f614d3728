use super::common::{
    created_response, success_response, validate_input, PaginatedResponse, PaginationParams,
};
use crate::{
    entities::stock_adjustment_headers::{AdjustmentStatus, AdjustmentType},
    errors::ServiceError,
    handlers::AppState,
    services::stock_adjustments::{CreateStockAdjustmentInput, StockAdjustmentLineInput},
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
pub struct StockAdjustmentLineRequest {
    pub item_id: i64,
    pub location_id: i64,
    #[validate(length(max = 64))]
    pub lot_number: Option<String>,
    pub physical_quantity: Decimal,
    #[serde(default)]
    pub unit_cost: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateStockAdjustmentRequest {
    pub warehouse_id: i64,
    pub adjustment_date: NaiveDate,
    pub adjustment_type: AdjustmentType,
    #[validate(length(min = 1, max = 1000))]
    pub reason: String,
    #[validate(length(min = 1))]
    pub lines: Vec<StockAdjustmentLineRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ApproveStockAdjustmentRequest {
    #[validate(length(min = 1, max = 255))]
    pub approved_by: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<AdjustmentStatus>,
}

// Handler functions

/// Create a draft stock adjustment
#[utoipa::path(
    post,
    path = "/api/v1/stock-adjustments",
    request_body = CreateStockAdjustmentRequest,
    responses(
        (status = 201, description = "Stock adjustment created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "stock-adjustments"
)]
pub async fn create_stock_adjustment(
    State(state): State<AppState>,
    Json(payload): Json<CreateStockAdjustmentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let input = CreateStockAdjustmentInput {
        warehouse_id: payload.warehouse_id,
        adjustment_date: payload.adjustment_date,
        adjustment_type: payload.adjustment_type,
        reason: payload.reason,
        lines: payload
            .lines
            .into_iter()
            .map(|line| StockAdjustmentLineInput {
                item_id: line.item_id,
                location_id: line.location_id,
                lot_number: line.lot_number,
                physical_quantity: line.physical_quantity,
                unit_cost: line.unit_cost,
            })
            .collect(),
    };
    let adjustment = state.services.stock_adjustments.create(input).await?;
    Ok(created_response(adjustment))
}

/// Approve a draft stock adjustment
#[utoipa::path(
    post,
    path = "/api/v1/stock-adjustments/{id}/approve",
    request_body = ApproveStockAdjustmentRequest,
    params(("id" = i64, Path, description = "Stock adjustment ID")),
    responses(
        (status = 200, description = "Stock adjustment approved"),
        (status = 409, description = "Adjustment cannot be approved", body = crate::errors::ErrorResponse)
    ),
    tag = "stock-adjustments"
)]
pub async fn approve_stock_adjustment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ApproveStockAdjustmentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let adjustment = state
        .services
        .stock_adjustments
        .approve(id, payload.approved_by)
        .await?;
    Ok(success_response(adjustment))
}

/// Post a stock adjustment, reconciling counts against live balances
#[utoipa::path(
    post,
    path = "/api/v1/stock-adjustments/{id}/post",
    params(("id" = i64, Path, description = "Stock adjustment ID")),
    responses(
        (status = 200, description = "Stock adjustment posted"),
        (status = 409, description = "Already posted or not approvable", body = crate::errors::ErrorResponse)
    ),
    tag = "stock-adjustments"
)]
pub async fn post_stock_adjustment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let adjustment = state.services.stock_adjustments.post(id).await?;
    Ok(success_response(adjustment))
}

/// Cancel a stock adjustment
#[utoipa::path(
    post,
    path = "/api/v1/stock-adjustments/{id}/cancel",
    params(("id" = i64, Path, description = "Stock adjustment ID")),
    responses(
        (status = 200, description = "Stock adjustment cancelled"),
        (status = 409, description = "Adjustment is terminal", body = crate::errors::ErrorResponse)
    ),
    tag = "stock-adjustments"
)]
pub async fn cancel_stock_adjustment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let adjustment = state.services.stock_adjustments.cancel(id).await?;
    Ok(success_response(adjustment))
}

/// Get a stock adjustment with its lines
#[utoipa::path(
    get,
    path = "/api/v1/stock-adjustments/{id}",
    params(("id" = i64, Path, description = "Stock adjustment ID")),
    responses(
        (status = 200, description = "Stock adjustment fetched"),
        (status = 404, description = "Stock adjustment not found", body = crate::errors::ErrorResponse)
    ),
    tag = "stock-adjustments"
)]
pub async fn get_stock_adjustment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let adjustment = state.services.stock_adjustments.get(id).await?;
    Ok(success_response(adjustment))
}

/// List stock adjustments, optionally filtered by status
#[utoipa::path(
    get,
    path = "/api/v1/stock-adjustments",
    responses((status = 200, description = "Stock adjustments listed")),
    tag = "stock-adjustments"
)]
pub async fn list_stock_adjustments(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (headers, total) = state
        .services
        .stock_adjustments
        .list(pagination.page, pagination.per_page, query.status)
        .await?;
    Ok(success_response(PaginatedResponse::new(
        headers,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Creates the router for stock adjustment endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(create_stock_adjustment).get(list_stock_adjustments),
        )
        .route("/:id", get(get_stock_adjustment))
        .route("/:id/approve", post(approve_stock_adjustment))
        .route("/:id/post", post(post_stock_adjustment))
        .route("/:id/cancel", post(cancel_stock_adjustment))
}
