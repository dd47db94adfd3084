//! `stockroom-core` — domain foundation for the stock ledger.
//!
//! This crate contains **pure domain** types and rules (no IO, no HTTP, no
//! storage): the warehouse and inventory entities, the (product, warehouse)
//! key, the non-negative-stock arithmetic, and the error model.

pub mod error;
pub mod model;

pub use error::{LedgerError, LedgerResult};
pub use model::{InventoryRecord, NewWarehouse, StockKey, Warehouse};
