use super::common::{
    created_response, no_content_response, success_response, validate_input, PaginatedResponse,
    PaginationParams,
};
use crate::{
    entities::purchase_order_headers::PurchaseOrderStatus,
    errors::ServiceError,
    handlers::AppState,
    services::purchase_orders::{CreatePurchaseOrderInput, PurchaseOrderLineInput},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Request DTOs

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct PurchaseOrderLineRequest {
    pub item_id: i64,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub tax_rate: Decimal,
    #[serde(default)]
    pub discount_rate: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseOrderRequest {
    pub supplier_id: i64,
    pub warehouse_id: i64,
    pub order_date: NaiveDate,
    pub expected_delivery_date: Option<NaiveDate>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    #[validate(length(min = 1))]
    pub lines: Vec<PurchaseOrderLineRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ApprovePurchaseOrderRequest {
    #[validate(length(min = 1, max = 255))]
    pub approved_by: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<PurchaseOrderStatus>,
}

impl CreatePurchaseOrderRequest {
    fn into_input(self) -> CreatePurchaseOrderInput {
        CreatePurchaseOrderInput {
            supplier_id: self.supplier_id,
            warehouse_id: self.warehouse_id,
            order_date: self.order_date,
            expected_delivery_date: self.expected_delivery_date,
            notes: self.notes,
            lines: self
                .lines
                .into_iter()
                .map(|line| PurchaseOrderLineInput {
                    item_id: line.item_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    tax_rate: line.tax_rate,
                    discount_rate: line.discount_rate,
                })
                .collect(),
        }
    }
}

// Handler functions

/// Create a new purchase order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders",
    request_body = CreatePurchaseOrderRequest,
    responses(
        (status = 201, description = "Purchase order created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn create_purchase_order(
    State(state): State<AppState>,
    Json(payload): Json<CreatePurchaseOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let po = state
        .services
        .purchase_orders
        .create(payload.into_input())
        .await?;
    Ok(created_response(po))
}

/// Get a purchase order with its lines
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}",
    params(("id" = i64, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Purchase order fetched"),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let po = state.services.purchase_orders.get(id).await?;
    Ok(success_response(po))
}

/// List purchase orders, optionally filtered by status
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders",
    responses((status = 200, description = "Purchase orders listed")),
    tag = "purchase-orders"
)]
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (headers, total) = state
        .services
        .purchase_orders
        .list(pagination.page, pagination.per_page, query.status)
        .await?;
    Ok(success_response(PaginatedResponse::new(
        headers,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Replace a draft purchase order
#[utoipa::path(
    put,
    path = "/api/v1/purchase-orders/{id}",
    request_body = CreatePurchaseOrderRequest,
    params(("id" = i64, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Purchase order updated"),
        (status = 409, description = "Order is not in Draft", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn update_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CreatePurchaseOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let po = state
        .services
        .purchase_orders
        .update(id, payload.into_input())
        .await?;
    Ok(success_response(po))
}

/// Approve a draft purchase order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/approve",
    request_body = ApprovePurchaseOrderRequest,
    params(("id" = i64, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Purchase order approved"),
        (status = 409, description = "Order cannot be approved", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn approve_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ApprovePurchaseOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let po = state
        .services
        .purchase_orders
        .approve(id, payload.approved_by)
        .await?;
    Ok(success_response(po))
}

/// Cancel a purchase order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{id}/cancel",
    params(("id" = i64, Path, description = "Purchase order ID")),
    responses(
        (status = 200, description = "Purchase order cancelled"),
        (status = 409, description = "Order cannot be cancelled", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn cancel_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let po = state.services.purchase_orders.cancel(id).await?;
    Ok(success_response(po))
}

/// Delete a draft purchase order
#[utoipa::path(
    delete,
    path = "/api/v1/purchase-orders/{id}",
    params(("id" = i64, Path, description = "Purchase order ID")),
    responses(
        (status = 204, description = "Purchase order deleted"),
        (status = 409, description = "Order is not in Draft", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn delete_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.purchase_orders.delete(id).await?;
    Ok(no_content_response())
}

/// Creates the router for purchase order endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_purchase_order).get(list_purchase_orders))
        .route("/:id", get(get_purchase_order))
        .route("/:id", put(update_purchase_order))
        .route("/:id", delete(delete_purchase_order))
        .route("/:id/approve", post(approve_purchase_order))
        .route("/:id/cancel", post(cancel_purchase_order))
}
