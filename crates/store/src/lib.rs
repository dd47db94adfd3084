//! `stockroom-store` — durable and in-memory storage for the stock ledger.
//!
//! The [`InventoryStore`] trait is the transaction boundary the ledger and
//! the warehouse registry share. Two implementations:
//!
//! - [`postgres::PostgresStore`]: the production backend. Adjustments run in
//!   a transaction with a row lock (`SELECT .. FOR UPDATE`), so concurrent
//!   adjustments on the same key are linearized by the database; warehouse
//!   uniqueness is enforced by the primary key, not a pre-check.
//! - [`in_memory::InMemoryStore`]: dev/test backend guarded by one mutex,
//!   which trivially satisfies the same per-key serialization.
//!
//! Both enforce the non-negative-stock invariant through
//! [`StockKey::apply_delta`] inside their atomic section, so a rejected
//! adjustment never leaves a partial write behind.

pub mod config;
pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;

use stockroom_core::{InventoryRecord, LedgerResult, NewWarehouse, StockKey, Warehouse};

pub use config::StoreConfig;
pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Storage contract shared by the stock ledger and the warehouse registry.
///
/// Every operation acquires and releases its own transaction (or lock); no
/// state is held between calls. Failure semantics per operation:
///
/// - `adjust_stock`: `InsufficientStock` aborts with nothing written;
///   infrastructure failures surface as `Storage`. No internal retry.
/// - `create_warehouse`: `DuplicateWarehouse` when the id already exists;
///   the store's uniqueness enforcement is authoritative.
/// - reads: `Storage` on infrastructure failure only; an unknown id is an
///   empty result (`None` / empty vec), not an error.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Atomically apply a signed delta to the stock level at `key`,
    /// materializing the record with stock 0 first if it does not exist.
    /// This is the only write path that mutates stock.
    async fn adjust_stock(&self, key: &StockKey, delta: i64) -> LedgerResult<InventoryRecord>;

    /// Persist a new warehouse. Fails with `DuplicateWarehouse` if the id is
    /// taken; the stored row is returned unchanged on success.
    async fn create_warehouse(&self, warehouse: NewWarehouse) -> LedgerResult<Warehouse>;

    /// Full scan of all warehouses. No pagination, no guaranteed order.
    async fn list_warehouses(&self) -> LedgerResult<Vec<Warehouse>>;

    /// Look up a single warehouse by id.
    async fn warehouse_by_id(&self, id: &str) -> LedgerResult<Option<Warehouse>>;

    /// All inventory records for a product, across warehouses.
    async fn inventory_by_product(&self, product_id: &str) -> LedgerResult<Vec<InventoryRecord>>;

    /// All inventory records held in one warehouse.
    async fn inventory_by_warehouse(
        &self,
        warehouse_id: &str,
    ) -> LedgerResult<Vec<InventoryRecord>>;
}
