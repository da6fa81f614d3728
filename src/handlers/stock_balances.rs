use super::common::{success_response, PaginatedResponse, PaginationParams};
use crate::{
    entities::stock_ledger::DocumentType,
    errors::ServiceError,
    handlers::AppState,
    services::stock_balances::{BalanceFilter, LedgerFilter},
};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub item_id: Option<i64>,
    pub warehouse_id: Option<i64>,
    pub location_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    pub item_id: Option<i64>,
    pub warehouse_id: Option<i64>,
    pub document_type: Option<DocumentType>,
    pub transaction_id: Option<Uuid>,
}

/// List stock balances
#[utoipa::path(
    get,
    path = "/api/v1/stock/balances",
    responses((status = 200, description = "Stock balances listed")),
    tag = "stock"
)]
pub async fn list_balances(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(query): Query<BalanceQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = BalanceFilter {
        item_id: query.item_id,
        warehouse_id: query.warehouse_id,
        location_id: query.location_id,
    };
    let (balances, total) = state
        .services
        .stock_balances
        .list_balances(filter, pagination.page, pagination.per_page)
        .await?;
    Ok(success_response(PaginatedResponse::new(
        balances,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// List stock ledger entries, newest first
#[utoipa::path(
    get,
    path = "/api/v1/stock/ledger",
    responses((status = 200, description = "Ledger entries listed")),
    tag = "stock"
)]
pub async fn list_ledger(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(query): Query<LedgerQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = LedgerFilter {
        item_id: query.item_id,
        warehouse_id: query.warehouse_id,
        document_type: query.document_type,
        transaction_id: query.transaction_id,
    };
    let (entries, total) = state
        .services
        .stock_balances
        .list_ledger(filter, pagination.page, pagination.per_page)
        .await?;
    Ok(success_response(PaginatedResponse::new(
        entries,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Creates the router for stock balance and ledger queries
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/balances", get(list_balances))
        .route("/ledger", get(list_ledger))
}
