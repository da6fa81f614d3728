//! Warehouse API Library
//!
//! Purchasing and inventory core: purchase orders, goods receipts with
//! quality control, stock adjustments, stock transfers, and the stock
//! balance store fed through a single posting path with an append-only
//! movement ledger.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod metrics;
pub mod migrator;
pub mod services;

pub use handlers::{app_router, AppServices, AppState};
