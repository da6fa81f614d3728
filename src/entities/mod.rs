pub mod goods_receipt_headers;
pub mod goods_receipt_lines;
pub mod items;
pub mod purchase_order_headers;
pub mod purchase_order_lines;
pub mod stock_adjustment_headers;
pub mod stock_adjustment_lines;
pub mod stock_balances;
pub mod stock_ledger;
pub mod stock_transfer_headers;
pub mod stock_transfer_lines;
pub mod suppliers;
pub mod warehouse_locations;
pub mod warehouses;
