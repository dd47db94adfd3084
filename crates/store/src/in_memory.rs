//! In-memory store for dev/test.
//!
//! One mutex guards the whole store, so every operation is atomic and
//! adjustments on the same key are serialized exactly as the Postgres
//! backend's row locks would serialize them (just with coarser granularity).

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use stockroom_core::{
    InventoryRecord, LedgerError, LedgerResult, NewWarehouse, StockKey, Warehouse,
};

use crate::InventoryStore;

#[derive(Debug, Default)]
struct State {
    // BTreeMap keeps iteration deterministic for tests; callers must not
    // rely on list ordering.
    warehouses: BTreeMap<String, Warehouse>,
    inventory: HashMap<(String, String), InventoryRecord>,
}

/// Non-durable [`InventoryStore`] backed by process memory.
///
/// Unlike the Postgres backend there is no foreign key here: the ledger's
/// permissive contract (adjustments may target warehouse ids that were never
/// registered) is fully visible.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryStore for InMemoryStore {
    async fn adjust_stock(&self, key: &StockKey, delta: i64) -> LedgerResult<InventoryRecord> {
        let mut state = self.inner.lock().expect("in-memory store poisoned");

        let map_key = (key.product_id().to_string(), key.warehouse_id().to_string());
        let stock = state.inventory.get(&map_key).map(|r| r.stock).unwrap_or(0);

        // Invariant check happens under the lock; a rejection writes nothing.
        let new_stock = key.apply_delta(stock, delta)?;

        let record = InventoryRecord {
            product_id: key.product_id().to_string(),
            warehouse_id: key.warehouse_id().to_string(),
            stock: new_stock,
            updated_at: Utc::now(),
        };
        state.inventory.insert(map_key, record.clone());
        Ok(record)
    }

    async fn create_warehouse(&self, warehouse: NewWarehouse) -> LedgerResult<Warehouse> {
        let mut state = self.inner.lock().expect("in-memory store poisoned");

        if state.warehouses.contains_key(&warehouse.id) {
            return Err(LedgerError::DuplicateWarehouse(warehouse.id));
        }

        let now = Utc::now();
        let stored = Warehouse {
            id: warehouse.id.clone(),
            name: warehouse.name,
            location: warehouse.location,
            created_at: now,
            updated_at: now,
        };
        state.warehouses.insert(warehouse.id, stored.clone());
        Ok(stored)
    }

    async fn list_warehouses(&self) -> LedgerResult<Vec<Warehouse>> {
        let state = self.inner.lock().expect("in-memory store poisoned");
        Ok(state.warehouses.values().cloned().collect())
    }

    async fn warehouse_by_id(&self, id: &str) -> LedgerResult<Option<Warehouse>> {
        let state = self.inner.lock().expect("in-memory store poisoned");
        Ok(state.warehouses.get(id).cloned())
    }

    async fn inventory_by_product(&self, product_id: &str) -> LedgerResult<Vec<InventoryRecord>> {
        let state = self.inner.lock().expect("in-memory store poisoned");
        let mut records: Vec<InventoryRecord> = state
            .inventory
            .values()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.warehouse_id.cmp(&b.warehouse_id));
        Ok(records)
    }

    async fn inventory_by_warehouse(
        &self,
        warehouse_id: &str,
    ) -> LedgerResult<Vec<InventoryRecord>> {
        let state = self.inner.lock().expect("in-memory store poisoned");
        let mut records: Vec<InventoryRecord> = state
            .inventory
            .values()
            .filter(|r| r.warehouse_id == warehouse_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.product_id.cmp(&b.product_id));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn key(product: &str, warehouse: &str) -> StockKey {
        StockKey::new(product, warehouse).unwrap()
    }

    #[tokio::test]
    async fn first_adjustment_materializes_the_record() {
        let store = InMemoryStore::new();
        let record = store.adjust_stock(&key("P001", "WH001"), 100).await.unwrap();
        assert_eq!(record.stock, 100);

        let by_product = store.inventory_by_product("P001").await.unwrap();
        assert_eq!(by_product.len(), 1);
        assert_eq!(by_product[0].warehouse_id, "WH001");
    }

    #[tokio::test]
    async fn adjust_sequence_from_the_contract() {
        // +100, -30, then an overdraw that must leave 70 behind.
        let store = InMemoryStore::new();
        let k = key("P001", "WH001");

        assert_eq!(store.adjust_stock(&k, 100).await.unwrap().stock, 100);
        assert_eq!(store.adjust_stock(&k, -30).await.unwrap().stock, 70);

        let err = store.adjust_stock(&k, -1000).await.unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientStock { stock: 70, .. }));

        let records = store.inventory_by_product("P001").await.unwrap();
        assert_eq!(records[0].stock, 70);

        // Retrying the failed call has no side effect either.
        let _ = store.adjust_stock(&k, -1000).await.unwrap_err();
        assert_eq!(store.inventory_by_product("P001").await.unwrap()[0].stock, 70);
    }

    #[tokio::test]
    async fn negative_first_adjustment_is_rejected() {
        let store = InMemoryStore::new();
        let err = store.adjust_stock(&key("P001", "WH001"), -5).await.unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientStock { stock: 0, .. }));
        assert!(store.inventory_by_product("P001").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn adjustments_target_unregistered_warehouses() {
        // Permissive by contract: no warehouse lookup on the adjust path.
        let store = InMemoryStore::new();
        let record = store.adjust_stock(&key("P001", "GHOST"), 3).await.unwrap();
        assert_eq!(record.warehouse_id, "GHOST");
        assert!(store.warehouse_by_id("GHOST").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_overdraw_loses_exactly_one() {
        let store = Arc::new(InMemoryStore::new());
        let k = key("P001", "WH001");
        store.adjust_stock(&k, 100).await.unwrap();

        // Each alone fits (100 - 80 >= 0); together they would overdraw.
        let mut tasks = Vec::new();
        for _ in 0..2 {
            let store = store.clone();
            let k = k.clone();
            tasks.push(tokio::spawn(async move { store.adjust_stock(&k, -80).await }));
        }

        let mut ok = 0;
        let mut insufficient = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(r) => {
                    assert_eq!(r.stock, 20);
                    ok += 1;
                }
                Err(LedgerError::InsufficientStock { .. }) => insufficient += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!((ok, insufficient), (1, 1));
        assert_eq!(store.inventory_by_product("P001").await.unwrap()[0].stock, 20);
    }

    #[tokio::test]
    async fn duplicate_warehouse_keeps_the_first_row() {
        let store = InMemoryStore::new();
        let first = NewWarehouse::new("WH001", "Main", Some("Jakarta".into())).unwrap();
        store.create_warehouse(first).await.unwrap();

        let second = NewWarehouse::new("WH001", "Other", Some("X".into())).unwrap();
        let err = store.create_warehouse(second).await.unwrap_err();
        assert_eq!(err, LedgerError::DuplicateWarehouse("WH001".into()));

        let stored = store.warehouse_by_id("WH001").await.unwrap().unwrap();
        assert_eq!(stored.name, "Main");
    }

    #[tokio::test]
    async fn reads_filter_by_product_and_warehouse() {
        let store = InMemoryStore::new();
        store.adjust_stock(&key("P001", "WH001"), 10).await.unwrap();
        store.adjust_stock(&key("P001", "WH002"), 20).await.unwrap();
        store.adjust_stock(&key("P002", "WH001"), 30).await.unwrap();

        let p1 = store.inventory_by_product("P001").await.unwrap();
        assert_eq!(p1.len(), 2);
        let wh1 = store.inventory_by_warehouse("WH001").await.unwrap();
        assert_eq!(wh1.len(), 2);
        assert!(store.inventory_by_product("P999").await.unwrap().is_empty());
    }
}
