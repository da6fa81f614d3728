use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_master_data::Migration),
            Box::new(m20240601_000002_create_purchase_orders::Migration),
            Box::new(m20240601_000003_create_goods_receipts::Migration),
            Box::new(m20240601_000004_create_stock_adjustments::Migration),
            Box::new(m20240601_000005_create_stock_transfers::Migration),
            Box::new(m20240601_000006_create_stock_balances_and_ledger::Migration),
        ]
    }
}

mod m20240601_000001_create_master_data {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_master_data"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suppliers::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Suppliers::Code).string().not_null())
                        .col(ColumnDef::new(Suppliers::Name).string().not_null())
                        .col(ColumnDef::new(Suppliers::ContactEmail).string())
                        .col(ColumnDef::new(Suppliers::Phone).string())
                        .col(
                            ColumnDef::new(Suppliers::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Suppliers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Suppliers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Warehouses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Warehouses::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Warehouses::Code).string().not_null())
                        .col(ColumnDef::new(Warehouses::Name).string().not_null())
                        .col(
                            ColumnDef::new(Warehouses::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Warehouses::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Warehouses::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WarehouseLocations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WarehouseLocations::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(WarehouseLocations::WarehouseId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WarehouseLocations::Code).string().not_null())
                        .col(ColumnDef::new(WarehouseLocations::Kind).string().not_null())
                        .col(
                            ColumnDef::new(WarehouseLocations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarehouseLocations::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Items::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Items::Sku).string().not_null())
                        .col(ColumnDef::new(Items::Name).string().not_null())
                        .col(ColumnDef::new(Items::ItemType).string().not_null())
                        .col(ColumnDef::new(Items::UnitOfMeasure).string().not_null())
                        .col(
                            ColumnDef::new(Items::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Items::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Items::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_items_sku")
                        .table(Items::Table)
                        .col(Items::Sku)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(WarehouseLocations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Warehouses::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Suppliers {
        Table,
        Id,
        Code,
        Name,
        ContactEmail,
        Phone,
        Active,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Warehouses {
        Table,
        Id,
        Code,
        Name,
        Active,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum WarehouseLocations {
        Table,
        Id,
        WarehouseId,
        Code,
        Kind,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Items {
        Table,
        Id,
        Sku,
        Name,
        ItemType,
        UnitOfMeasure,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000002_create_purchase_orders {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_purchase_orders"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrderHeaders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrderHeaders::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderHeaders::PoNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderHeaders::SupplierId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderHeaders::WarehouseId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderHeaders::OrderDate)
                                .date()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrderHeaders::ExpectedDeliveryDate).date())
                        .col(
                            ColumnDef::new(PurchaseOrderHeaders::Status)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderHeaders::Subtotal)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderHeaders::TaxTotal)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderHeaders::DiscountTotal)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderHeaders::Total)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrderHeaders::ApprovedBy).string())
                        .col(
                            ColumnDef::new(PurchaseOrderHeaders::ApprovedAt)
                                .timestamp_with_time_zone(),
                        )
                        .col(ColumnDef::new(PurchaseOrderHeaders::Notes).string())
                        .col(
                            ColumnDef::new(PurchaseOrderHeaders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderHeaders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_po_headers_po_number")
                        .table(PurchaseOrderHeaders::Table)
                        .col(PurchaseOrderHeaders::PoNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrderLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrderLines::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::PoHeaderId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::LineNum)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::Quantity)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::UnitPrice)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::TaxRate)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::DiscountRate)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::LineTotal)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::ReceivedQuantity)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderLines::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_po_lines_header")
                        .table(PurchaseOrderLines::Table)
                        .col(PurchaseOrderLines::PoHeaderId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrderLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseOrderHeaders::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum PurchaseOrderHeaders {
        Table,
        Id,
        PoNumber,
        SupplierId,
        WarehouseId,
        OrderDate,
        ExpectedDeliveryDate,
        Status,
        Subtotal,
        TaxTotal,
        DiscountTotal,
        Total,
        ApprovedBy,
        ApprovedAt,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum PurchaseOrderLines {
        Table,
        Id,
        PoHeaderId,
        LineNum,
        ItemId,
        Quantity,
        UnitPrice,
        TaxRate,
        DiscountRate,
        LineTotal,
        ReceivedQuantity,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000003_create_goods_receipts {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_goods_receipts"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(GoodsReceiptHeaders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(GoodsReceiptHeaders::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptHeaders::GrnNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptHeaders::PoHeaderId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptHeaders::WarehouseId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptHeaders::ReceiptDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptHeaders::OverallQcStatus)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptHeaders::Posted)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptHeaders::PostedAt)
                                .timestamp_with_time_zone(),
                        )
                        .col(ColumnDef::new(GoodsReceiptHeaders::Notes).string())
                        .col(
                            ColumnDef::new(GoodsReceiptHeaders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptHeaders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_grn_headers_po")
                        .table(GoodsReceiptHeaders::Table)
                        .col(GoodsReceiptHeaders::PoHeaderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(GoodsReceiptLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(GoodsReceiptLines::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptLines::GrnHeaderId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptLines::PoLineId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptLines::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptLines::LocationId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptLines::Quantity)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptLines::UnitCost)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(GoodsReceiptLines::LotNumber).string())
                        .col(ColumnDef::new(GoodsReceiptLines::ManufactureDate).date())
                        .col(ColumnDef::new(GoodsReceiptLines::ExpiryDate).date())
                        .col(
                            ColumnDef::new(GoodsReceiptLines::AcceptedQuantity)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptLines::RejectedQuantity)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptLines::QcStatus)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(GoodsReceiptLines::QcNotes).string())
                        .col(
                            ColumnDef::new(GoodsReceiptLines::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(GoodsReceiptLines::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_grn_lines_header")
                        .table(GoodsReceiptLines::Table)
                        .col(GoodsReceiptLines::GrnHeaderId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(GoodsReceiptLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(GoodsReceiptHeaders::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum GoodsReceiptHeaders {
        Table,
        Id,
        GrnNumber,
        PoHeaderId,
        WarehouseId,
        ReceiptDate,
        OverallQcStatus,
        Posted,
        PostedAt,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum GoodsReceiptLines {
        Table,
        Id,
        GrnHeaderId,
        PoLineId,
        ItemId,
        LocationId,
        Quantity,
        UnitCost,
        LotNumber,
        ManufactureDate,
        ExpiryDate,
        AcceptedQuantity,
        RejectedQuantity,
        QcStatus,
        QcNotes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000004_create_stock_adjustments {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_stock_adjustments"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockAdjustmentHeaders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockAdjustmentHeaders::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustmentHeaders::AdjustmentNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustmentHeaders::WarehouseId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustmentHeaders::AdjustmentDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustmentHeaders::AdjustmentType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustmentHeaders::Reason)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustmentHeaders::Status)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockAdjustmentHeaders::ApprovedBy).string())
                        .col(
                            ColumnDef::new(StockAdjustmentHeaders::ApprovedAt)
                                .timestamp_with_time_zone(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustmentHeaders::PostedAt)
                                .timestamp_with_time_zone(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustmentHeaders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustmentHeaders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StockAdjustmentLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockAdjustmentLines::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustmentLines::AdjustmentHeaderId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustmentLines::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustmentLines::LocationId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockAdjustmentLines::LotNumber).string())
                        .col(
                            ColumnDef::new(StockAdjustmentLines::PreviousQuantity)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustmentLines::PhysicalQuantity)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustmentLines::AdjustmentQuantity)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustmentLines::NewQuantity)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustmentLines::UnitCost)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustmentLines::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAdjustmentLines::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_adjustment_lines_header")
                        .table(StockAdjustmentLines::Table)
                        .col(StockAdjustmentLines::AdjustmentHeaderId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockAdjustmentLines::Table).to_owned())
                .await?;
            manager
                .drop_table(
                    Table::drop()
                        .table(StockAdjustmentHeaders::Table)
                        .to_owned(),
                )
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum StockAdjustmentHeaders {
        Table,
        Id,
        AdjustmentNumber,
        WarehouseId,
        AdjustmentDate,
        AdjustmentType,
        Reason,
        Status,
        ApprovedBy,
        ApprovedAt,
        PostedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum StockAdjustmentLines {
        Table,
        Id,
        AdjustmentHeaderId,
        ItemId,
        LocationId,
        LotNumber,
        PreviousQuantity,
        PhysicalQuantity,
        AdjustmentQuantity,
        NewQuantity,
        UnitCost,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000005_create_stock_transfers {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000005_create_stock_transfers"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockTransferHeaders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockTransferHeaders::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(StockTransferHeaders::TransferNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransferHeaders::FromWarehouseId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransferHeaders::ToWarehouseId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransferHeaders::TransferDate)
                                .date()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransferHeaders::Status)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransferHeaders::PostedAt)
                                .timestamp_with_time_zone(),
                        )
                        .col(
                            ColumnDef::new(StockTransferHeaders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransferHeaders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StockTransferLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockTransferLines::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(StockTransferLines::TransferHeaderId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransferLines::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransferLines::FromLocationId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransferLines::ToLocationId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockTransferLines::LotNumber).string())
                        .col(
                            ColumnDef::new(StockTransferLines::Quantity)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransferLines::ReceivedQuantity)
                                .decimal_len(16, 4),
                        )
                        .col(
                            ColumnDef::new(StockTransferLines::UnitCost)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransferLines::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransferLines::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_transfer_lines_header")
                        .table(StockTransferLines::Table)
                        .col(StockTransferLines::TransferHeaderId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockTransferLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StockTransferHeaders::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum StockTransferHeaders {
        Table,
        Id,
        TransferNumber,
        FromWarehouseId,
        ToWarehouseId,
        TransferDate,
        Status,
        PostedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum StockTransferLines {
        Table,
        Id,
        TransferHeaderId,
        ItemId,
        FromLocationId,
        ToLocationId,
        LotNumber,
        Quantity,
        ReceivedQuantity,
        UnitCost,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000006_create_stock_balances_and_ledger {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000006_create_stock_balances_and_ledger"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockBalances::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockBalances::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(StockBalances::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockBalances::WarehouseId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockBalances::LocationId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockBalances::LotNumber)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(StockBalances::QuantityOnHand)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockBalances::Version)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(StockBalances::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockBalances::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_stock_balances_key")
                        .table(StockBalances::Table)
                        .col(StockBalances::ItemId)
                        .col(StockBalances::WarehouseId)
                        .col(StockBalances::LocationId)
                        .col(StockBalances::LotNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StockLedger::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockLedger::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(StockLedger::TransactionId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockLedger::DocumentType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockLedger::DocumentId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockLedger::ItemId).big_integer().not_null())
                        .col(
                            ColumnDef::new(StockLedger::WarehouseId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockLedger::LocationId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockLedger::LotNumber).string().not_null())
                        .col(
                            ColumnDef::new(StockLedger::QuantityDelta)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockLedger::BalanceAfter)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockLedger::PostedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_stock_ledger_item")
                        .table(StockLedger::Table)
                        .col(StockLedger::ItemId)
                        .col(StockLedger::WarehouseId)
                        .col(StockLedger::LocationId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_stock_ledger_document")
                        .table(StockLedger::Table)
                        .col(StockLedger::DocumentType)
                        .col(StockLedger::DocumentId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockLedger::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StockBalances::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum StockBalances {
        Table,
        Id,
        ItemId,
        WarehouseId,
        LocationId,
        LotNumber,
        QuantityOnHand,
        Version,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum StockLedger {
        Table,
        Id,
        TransactionId,
        DocumentType,
        DocumentId,
        ItemId,
        WarehouseId,
        LocationId,
        LotNumber,
        QuantityDelta,
        BalanceAfter,
        PostedAt,
    }
}
