use crate::{
    db::DbPool,
    entities::{
        items::{self, Entity as Item, ItemType},
        suppliers::{self, Entity as Supplier},
        warehouse_locations::{self, Entity as WarehouseLocation, LocationKind},
        warehouses::{self, Entity as Warehouse},
    },
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSupplierInput {
    pub code: String,
    pub name: String,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWarehouseInput {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLocationInput {
    pub warehouse_id: i64,
    pub code: String,
    pub kind: LocationKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateItemInput {
    pub sku: String,
    pub name: String,
    pub item_type: ItemType,
    pub unit_of_measure: String,
}

/// Master data CRUD: suppliers, warehouses, locations and items. Document
/// services resolve references through these tables and fail closed when a
/// referenced row is missing.
#[derive(Clone)]
pub struct MasterDataService {
    db_pool: Arc<DbPool>,
}

impl MasterDataService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, input))]
    pub async fn create_supplier(
        &self,
        input: CreateSupplierInput,
    ) -> Result<suppliers::Model, ServiceError> {
        let now = Utc::now();
        let supplier = suppliers::ActiveModel {
            code: Set(input.code),
            name: Set(input.name),
            contact_email: Set(input.contact_email),
            phone: Set(input.phone),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db_pool.as_ref())
        .await?;
        Ok(supplier)
    }

    pub async fn get_supplier(&self, id: i64) -> Result<suppliers::Model, ServiceError> {
        Supplier::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("supplier {} not found", id)))
    }

    pub async fn list_suppliers(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<suppliers::Model>, u64), ServiceError> {
        let paginator = Supplier::find()
            .order_by_asc(suppliers::Column::Code)
            .paginate(self.db_pool.as_ref(), per_page);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((rows, total))
    }

    #[instrument(skip(self, input))]
    pub async fn create_warehouse(
        &self,
        input: CreateWarehouseInput,
    ) -> Result<warehouses::Model, ServiceError> {
        let now = Utc::now();
        let warehouse = warehouses::ActiveModel {
            code: Set(input.code),
            name: Set(input.name),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db_pool.as_ref())
        .await?;
        Ok(warehouse)
    }

    pub async fn get_warehouse(&self, id: i64) -> Result<warehouses::Model, ServiceError> {
        Warehouse::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("warehouse {} not found", id)))
    }

    pub async fn list_warehouses(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<warehouses::Model>, u64), ServiceError> {
        let paginator = Warehouse::find()
            .order_by_asc(warehouses::Column::Code)
            .paginate(self.db_pool.as_ref(), per_page);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((rows, total))
    }

    #[instrument(skip(self, input))]
    pub async fn create_location(
        &self,
        input: CreateLocationInput,
    ) -> Result<warehouse_locations::Model, ServiceError> {
        self.get_warehouse(input.warehouse_id).await?;
        let now = Utc::now();
        let location = warehouse_locations::ActiveModel {
            warehouse_id: Set(input.warehouse_id),
            code: Set(input.code),
            kind: Set(input.kind),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db_pool.as_ref())
        .await?;
        Ok(location)
    }

    pub async fn list_locations(
        &self,
        warehouse_id: i64,
    ) -> Result<Vec<warehouse_locations::Model>, ServiceError> {
        self.get_warehouse(warehouse_id).await?;
        let locations = WarehouseLocation::find()
            .filter(warehouse_locations::Column::WarehouseId.eq(warehouse_id))
            .order_by_asc(warehouse_locations::Column::Code)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(locations)
    }

    #[instrument(skip(self, input))]
    pub async fn create_item(&self, input: CreateItemInput) -> Result<items::Model, ServiceError> {
        let now = Utc::now();
        let item = items::ActiveModel {
            sku: Set(input.sku),
            name: Set(input.name),
            item_type: Set(input.item_type),
            unit_of_measure: Set(input.unit_of_measure),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db_pool.as_ref())
        .await?;
        Ok(item)
    }

    pub async fn get_item(&self, id: i64) -> Result<items::Model, ServiceError> {
        Item::find_by_id(id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("item {} not found", id)))
    }

    pub async fn list_items(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<items::Model>, u64), ServiceError> {
        let paginator = Item::find()
            .order_by_asc(items::Column::Sku)
            .paginate(self.db_pool.as_ref(), per_page);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((rows, total))
    }
}
