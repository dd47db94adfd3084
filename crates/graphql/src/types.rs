//! GraphQL object and input types.
//!
//! These mirror the domain entities field-for-field; the extra resolvers are
//! the two relationship edges. Each edge is an independent store lookup per
//! parent (no batching) — a known N+1 pattern, acceptable at this scale.

use std::sync::Arc;

use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject};
use chrono::{DateTime, Utc};

use stockroom_core::model;
use stockroom_store::InventoryStore;

use crate::schema::{ledger_error, store};

/// A storage location for stock.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Warehouse {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[ComplexObject]
impl Warehouse {
    /// All inventory records held in this warehouse.
    async fn inventory(&self, ctx: &Context<'_>) -> Result<Vec<Inventory>> {
        let records = store(ctx)?
            .inventory_by_warehouse(&self.id)
            .await
            .map_err(ledger_error)?;
        Ok(records.into_iter().map(Inventory::from).collect())
    }
}

/// Per-(product, warehouse) stock level.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Inventory {
    pub product_id: String,
    pub warehouse_id: String,
    pub stock: i64,
    pub updated_at: DateTime<Utc>,
}

#[ComplexObject]
impl Inventory {
    /// The warehouse this record belongs to. Null when the warehouse id was
    /// never registered (the ledger does not validate it).
    async fn warehouse(&self, ctx: &Context<'_>) -> Result<Option<Warehouse>> {
        let warehouse = store(ctx)?
            .warehouse_by_id(&self.warehouse_id)
            .await
            .map_err(ledger_error)?;
        Ok(warehouse.map(Warehouse::from))
    }
}

#[derive(Debug, InputObject)]
pub struct UpdateStockInput {
    pub product_id: String,
    pub warehouse_id: String,
    /// Positive for an increase, negative for a reduction.
    pub quantity_change: i64,
}

#[derive(Debug, InputObject)]
pub struct CreateWarehouseInput {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
}

impl From<model::Warehouse> for Warehouse {
    fn from(w: model::Warehouse) -> Self {
        Self {
            id: w.id,
            name: w.name,
            location: w.location,
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

impl From<model::InventoryRecord> for Inventory {
    fn from(r: model::InventoryRecord) -> Self {
        Self {
            product_id: r.product_id,
            warehouse_id: r.warehouse_id,
            stock: r.stock,
            updated_at: r.updated_at,
        }
    }
}

// Keeps the `dyn` type spelled out once for context extraction.
pub(crate) type SharedStore = Arc<dyn InventoryStore>;
