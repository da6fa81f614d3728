use super::common::{
    created_response, success_response, validate_input, PaginatedResponse, PaginationParams,
};
use crate::{
    errors::ServiceError,
    handlers::AppState,
    services::goods_receipts::{CreateGoodsReceiptInput, GoodsReceiptLineInput, QcAssessment},
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
pub struct GoodsReceiptLineRequest {
    pub po_line_id: i64,
    pub location_id: i64,
    pub quantity: Decimal,
    #[validate(length(max = 64))]
    pub lot_number: Option<String>,
    pub manufacture_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateGoodsReceiptRequest {
    pub po_header_id: i64,
    pub receipt_date: NaiveDate,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    #[validate(length(min = 1))]
    pub lines: Vec<GoodsReceiptLineRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct QcAssessmentRequest {
    pub grn_line_id: i64,
    pub accepted_quantity: Decimal,
    pub rejected_quantity: Decimal,
    #[validate(length(max = 1000))]
    pub qc_notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordQcRequest {
    #[validate(length(min = 1))]
    pub assessments: Vec<QcAssessmentRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub po_header_id: Option<i64>,
}

// Handler functions

/// Create a goods receipt against an approved purchase order
#[utoipa::path(
    post,
    path = "/api/v1/goods-receipts",
    request_body = CreateGoodsReceiptRequest,
    responses(
        (status = 201, description = "Goods receipt created"),
        (status = 400, description = "Quantity exceeds remaining", body = crate::errors::ErrorResponse),
        (status = 409, description = "Purchase order not approved", body = crate::errors::ErrorResponse)
    ),
    tag = "goods-receipts"
)]
pub async fn create_goods_receipt(
    State(state): State<AppState>,
    Json(payload): Json<CreateGoodsReceiptRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let input = CreateGoodsReceiptInput {
        po_header_id: payload.po_header_id,
        receipt_date: payload.receipt_date,
        notes: payload.notes,
        lines: payload
            .lines
            .into_iter()
            .map(|line| GoodsReceiptLineInput {
                po_line_id: line.po_line_id,
                location_id: line.location_id,
                quantity: line.quantity,
                lot_number: line.lot_number,
                manufacture_date: line.manufacture_date,
                expiry_date: line.expiry_date,
            })
            .collect(),
    };
    let receipt = state.services.goods_receipts.create(input).await?;
    Ok(created_response(receipt))
}

/// Record quality-control results for receipt lines
#[utoipa::path(
    post,
    path = "/api/v1/goods-receipts/{id}/qc",
    request_body = RecordQcRequest,
    params(("id" = i64, Path, description = "Goods receipt ID")),
    responses(
        (status = 200, description = "QC recorded"),
        (status = 400, description = "Split does not match quantity", body = crate::errors::ErrorResponse),
        (status = 409, description = "Receipt already posted", body = crate::errors::ErrorResponse)
    ),
    tag = "goods-receipts"
)]
pub async fn record_qc(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<RecordQcRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let assessments = payload
        .assessments
        .into_iter()
        .map(|a| QcAssessment {
            grn_line_id: a.grn_line_id,
            accepted_quantity: a.accepted_quantity,
            rejected_quantity: a.rejected_quantity,
            qc_notes: a.qc_notes,
        })
        .collect();
    let receipt = state.services.goods_receipts.record_qc(id, assessments).await?;
    Ok(success_response(receipt))
}

/// Post a quality-assessed goods receipt
#[utoipa::path(
    post,
    path = "/api/v1/goods-receipts/{id}/post",
    params(("id" = i64, Path, description = "Goods receipt ID")),
    responses(
        (status = 200, description = "Goods receipt posted"),
        (status = 409, description = "Already posted or QC pending", body = crate::errors::ErrorResponse)
    ),
    tag = "goods-receipts"
)]
pub async fn post_goods_receipt(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let receipt = state.services.goods_receipts.post(id).await?;
    Ok(success_response(receipt))
}

/// Get a goods receipt with its lines
#[utoipa::path(
    get,
    path = "/api/v1/goods-receipts/{id}",
    params(("id" = i64, Path, description = "Goods receipt ID")),
    responses(
        (status = 200, description = "Goods receipt fetched"),
        (status = 404, description = "Goods receipt not found", body = crate::errors::ErrorResponse)
    ),
    tag = "goods-receipts"
)]
pub async fn get_goods_receipt(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let receipt = state.services.goods_receipts.get(id).await?;
    Ok(success_response(receipt))
}

/// List goods receipts, optionally filtered by purchase order
#[utoipa::path(
    get,
    path = "/api/v1/goods-receipts",
    responses((status = 200, description = "Goods receipts listed")),
    tag = "goods-receipts"
)]
pub async fn list_goods_receipts(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (headers, total) = state
        .services
        .goods_receipts
        .list(pagination.page, pagination.per_page, query.po_header_id)
        .await?;
    Ok(success_response(PaginatedResponse::new(
        headers,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Creates the router for goods receipt endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_goods_receipt).get(list_goods_receipts))
        .route("/:id", get(get_goods_receipt))
        .route("/:id/qc", post(record_qc))
        .route("/:id/post", post(post_goods_receipt))
}
