use super::common::{
    created_response, success_response, validate_input, PaginatedResponse, PaginationParams,
};
use crate::{
    entities::{items::ItemType, warehouse_locations::LocationKind},
    errors::ServiceError,
    handlers::AppState,
    services::master_data::{
        CreateItemInput, CreateLocationInput, CreateSupplierInput, CreateWarehouseInput,
    },
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Request DTOs

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateWarehouseRequest {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateLocationRequest {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    pub kind: LocationKind,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 64))]
    pub sku: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub item_type: ItemType,
    #[validate(length(min = 1, max = 16))]
    pub unit_of_measure: String,
}

// Supplier handlers

/// Create a supplier
#[utoipa::path(
    post,
    path = "/api/v1/suppliers",
    request_body = CreateSupplierRequest,
    responses((status = 201, description = "Supplier created")),
    tag = "master-data"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    Json(payload): Json<CreateSupplierRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let supplier = state
        .services
        .master_data
        .create_supplier(CreateSupplierInput {
            code: payload.code,
            name: payload.name,
            contact_email: payload.contact_email,
            phone: payload.phone,
        })
        .await?;
    Ok(created_response(supplier))
}

/// Get a supplier
#[utoipa::path(
    get,
    path = "/api/v1/suppliers/{id}",
    params(("id" = i64, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier fetched"),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplier = state.services.master_data.get_supplier(id).await?;
    Ok(success_response(supplier))
}

/// List suppliers
#[utoipa::path(
    get,
    path = "/api/v1/suppliers",
    responses((status = 200, description = "Suppliers listed")),
    tag = "master-data"
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (rows, total) = state
        .services
        .master_data
        .list_suppliers(pagination.page, pagination.per_page)
        .await?;
    Ok(success_response(PaginatedResponse::new(
        rows,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

// Warehouse handlers

/// Create a warehouse
#[utoipa::path(
    post,
    path = "/api/v1/warehouses",
    request_body = CreateWarehouseRequest,
    responses((status = 201, description = "Warehouse created")),
    tag = "master-data"
)]
pub async fn create_warehouse(
    State(state): State<AppState>,
    Json(payload): Json<CreateWarehouseRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let warehouse = state
        .services
        .master_data
        .create_warehouse(CreateWarehouseInput {
            code: payload.code,
            name: payload.name,
        })
        .await?;
    Ok(created_response(warehouse))
}

/// Get a warehouse
#[utoipa::path(
    get,
    path = "/api/v1/warehouses/{id}",
    params(("id" = i64, Path, description = "Warehouse ID")),
    responses(
        (status = 200, description = "Warehouse fetched"),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn get_warehouse(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let warehouse = state.services.master_data.get_warehouse(id).await?;
    Ok(success_response(warehouse))
}

/// List warehouses
#[utoipa::path(
    get,
    path = "/api/v1/warehouses",
    responses((status = 200, description = "Warehouses listed")),
    tag = "master-data"
)]
pub async fn list_warehouses(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (rows, total) = state
        .services
        .master_data
        .list_warehouses(pagination.page, pagination.per_page)
        .await?;
    Ok(success_response(PaginatedResponse::new(
        rows,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Create a location within a warehouse
#[utoipa::path(
    post,
    path = "/api/v1/warehouses/{id}/locations",
    request_body = CreateLocationRequest,
    params(("id" = i64, Path, description = "Warehouse ID")),
    responses(
        (status = 201, description = "Location created"),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn create_location(
    State(state): State<AppState>,
    Path(warehouse_id): Path<i64>,
    Json(payload): Json<CreateLocationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let location = state
        .services
        .master_data
        .create_location(CreateLocationInput {
            warehouse_id,
            code: payload.code,
            kind: payload.kind,
        })
        .await?;
    Ok(created_response(location))
}

/// List locations of a warehouse
#[utoipa::path(
    get,
    path = "/api/v1/warehouses/{id}/locations",
    params(("id" = i64, Path, description = "Warehouse ID")),
    responses((status = 200, description = "Locations listed")),
    tag = "master-data"
)]
pub async fn list_locations(
    State(state): State<AppState>,
    Path(warehouse_id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let locations = state.services.master_data.list_locations(warehouse_id).await?;
    Ok(success_response(locations))
}

// Item handlers

/// Create an item
#[utoipa::path(
    post,
    path = "/api/v1/items",
    request_body = CreateItemRequest,
    responses((status = 201, description = "Item created")),
    tag = "master-data"
)]
pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&payload)?;
    let item = state
        .services
        .master_data
        .create_item(CreateItemInput {
            sku: payload.sku,
            name: payload.name,
            item_type: payload.item_type,
            unit_of_measure: payload.unit_of_measure,
        })
        .await?;
    Ok(created_response(item))
}

/// Get an item
#[utoipa::path(
    get,
    path = "/api/v1/items/{id}",
    params(("id" = i64, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item fetched"),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    tag = "master-data"
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.master_data.get_item(id).await?;
    Ok(success_response(item))
}

/// List items
#[utoipa::path(
    get,
    path = "/api/v1/items",
    responses((status = 200, description = "Items listed")),
    tag = "master-data"
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let (rows, total) = state
        .services
        .master_data
        .list_items(pagination.page, pagination.per_page)
        .await?;
    Ok(success_response(PaginatedResponse::new(
        rows,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

// Routers

pub fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_supplier).get(list_suppliers))
        .route("/:id", get(get_supplier))
}

pub fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_warehouse).get(list_warehouses))
        .route("/:id", get(get_warehouse))
        .route("/:id/locations", post(create_location).get(list_locations))
}

pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_item).get(list_items))
        .route("/:id", get(get_item))
}
