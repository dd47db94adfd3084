//! Query and mutation roots.
//!
//! Thin dispatch only: extract parameters, call the store, map errors. The
//! error mapping attaches the stable code (`insufficient_stock`,
//! `duplicate_warehouse`, ...) as a `code` extension so protocol layers can
//! translate failures without parsing messages.

use async_graphql::{Context, Error, ErrorExtensions, Object, Result};

use stockroom_core::{LedgerError, NewWarehouse, StockKey};

use crate::types::{CreateWarehouseInput, Inventory, SharedStore, UpdateStockInput, Warehouse};

pub(crate) fn store<'a>(ctx: &Context<'a>) -> Result<&'a SharedStore> {
    ctx.data::<SharedStore>()
}

pub(crate) fn ledger_error(err: LedgerError) -> Error {
    let code = err.code();
    Error::new(err.to_string()).extend_with(|_, ext| ext.set("code", code))
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Stock for one product across all warehouses.
    async fn get_inventory_by_product(
        &self,
        ctx: &Context<'_>,
        product_id: String,
    ) -> Result<Vec<Inventory>> {
        let records = store(ctx)?
            .inventory_by_product(&product_id)
            .await
            .map_err(ledger_error)?;
        Ok(records.into_iter().map(Inventory::from).collect())
    }

    /// Stock held in one warehouse.
    async fn get_inventory_by_warehouse(
        &self,
        ctx: &Context<'_>,
        warehouse_id: String,
    ) -> Result<Vec<Inventory>> {
        let records = store(ctx)?
            .inventory_by_warehouse(&warehouse_id)
            .await
            .map_err(ledger_error)?;
        Ok(records.into_iter().map(Inventory::from).collect())
    }

    async fn get_all_warehouses(&self, ctx: &Context<'_>) -> Result<Vec<Warehouse>> {
        let warehouses = store(ctx)?.list_warehouses().await.map_err(ledger_error)?;
        Ok(warehouses.into_iter().map(Warehouse::from).collect())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Apply a signed stock adjustment; fails without a partial write if the
    /// result would be negative.
    async fn update_stock(
        &self,
        ctx: &Context<'_>,
        input: UpdateStockInput,
    ) -> Result<Inventory> {
        let key =
            StockKey::new(input.product_id, input.warehouse_id).map_err(ledger_error)?;
        let record = store(ctx)?
            .adjust_stock(&key, input.quantity_change)
            .await
            .map_err(ledger_error)?;
        Ok(record.into())
    }

    async fn create_warehouse(
        &self,
        ctx: &Context<'_>,
        input: CreateWarehouseInput,
    ) -> Result<Warehouse> {
        let warehouse =
            NewWarehouse::new(input.id, input.name, input.location).map_err(ledger_error)?;
        let stored = store(ctx)?
            .create_warehouse(warehouse)
            .await
            .map_err(ledger_error)?;
        Ok(stored.into())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use stockroom_store::InMemoryStore;

    use crate::{build_schema, StockroomSchema};

    fn schema() -> StockroomSchema {
        build_schema(Arc::new(InMemoryStore::new()))
    }

    async fn execute(schema: &StockroomSchema, query: &str) -> serde_json::Value {
        let resp = schema.execute(query).await;
        assert!(resp.errors.is_empty(), "unexpected errors: {:?}", resp.errors);
        resp.data.into_json().expect("data is json")
    }

    #[tokio::test]
    async fn update_stock_creates_and_adjusts() {
        let schema = schema();

        let data = execute(
            &schema,
            r#"mutation {
                updateStock(input: { productId: "P001", warehouseId: "WH001", quantityChange: 100 }) {
                    productId warehouseId stock
                }
            }"#,
        )
        .await;
        assert_eq!(data["updateStock"]["stock"], 100);

        let data = execute(
            &schema,
            r#"mutation {
                updateStock(input: { productId: "P001", warehouseId: "WH001", quantityChange: -30 }) {
                    stock
                }
            }"#,
        )
        .await;
        assert_eq!(data["updateStock"]["stock"], 70);
    }

    #[tokio::test]
    async fn overdraw_surfaces_code_and_leaves_stock_alone() {
        let schema = schema();
        execute(
            &schema,
            r#"mutation { updateStock(input: { productId: "P001", warehouseId: "WH001", quantityChange: 70 }) { stock } }"#,
        )
        .await;

        let resp = schema
            .execute(
                r#"mutation { updateStock(input: { productId: "P001", warehouseId: "WH001", quantityChange: -1000 }) { stock } }"#,
            )
            .await;
        assert_eq!(resp.errors.len(), 1);
        let err = serde_json::to_value(&resp.errors[0]).unwrap();
        assert_eq!(err["extensions"]["code"], "insufficient_stock");

        let data = execute(
            &schema,
            r#"query { getInventoryByProduct(productId: "P001") { stock } }"#,
        )
        .await;
        assert_eq!(data["getInventoryByProduct"][0]["stock"], 70);
    }

    #[tokio::test]
    async fn empty_product_id_fails_validation() {
        let schema = schema();
        let resp = schema
            .execute(
                r#"mutation { updateStock(input: { productId: "", warehouseId: "WH001", quantityChange: 1 }) { stock } }"#,
            )
            .await;
        assert_eq!(resp.errors.len(), 1);
        let err = serde_json::to_value(&resp.errors[0]).unwrap();
        assert_eq!(err["extensions"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn create_warehouse_is_not_idempotent() {
        let schema = schema();
        let data = execute(
            &schema,
            r#"mutation {
                createWarehouse(input: { id: "WH001", name: "Main", location: "Jakarta" }) {
                    id name location
                }
            }"#,
        )
        .await;
        assert_eq!(data["createWarehouse"]["name"], "Main");

        let resp = schema
            .execute(
                r#"mutation { createWarehouse(input: { id: "WH001", name: "Other", location: "X" }) { id } }"#,
            )
            .await;
        assert_eq!(resp.errors.len(), 1);
        let err = serde_json::to_value(&resp.errors[0]).unwrap();
        assert_eq!(err["extensions"]["code"], "duplicate_warehouse");

        // First write wins.
        let data = execute(&schema, r#"query { getAllWarehouses { id name } }"#).await;
        assert_eq!(data["getAllWarehouses"][0]["name"], "Main");
    }

    #[tokio::test]
    async fn relationship_resolvers_walk_both_edges() {
        let schema = schema();
        execute(
            &schema,
            r#"mutation { createWarehouse(input: { id: "WH001", name: "Main" }) { id } }"#,
        )
        .await;
        execute(
            &schema,
            r#"mutation { updateStock(input: { productId: "P001", warehouseId: "WH001", quantityChange: 5 }) { stock } }"#,
        )
        .await;

        let data = execute(
            &schema,
            r#"query {
                getInventoryByProduct(productId: "P001") {
                    stock
                    warehouse { id name }
                }
            }"#,
        )
        .await;
        assert_eq!(data["getInventoryByProduct"][0]["warehouse"]["name"], "Main");

        let data = execute(
            &schema,
            r#"query { getAllWarehouses { id inventory { productId stock } } }"#,
        )
        .await;
        assert_eq!(data["getAllWarehouses"][0]["inventory"][0]["productId"], "P001");
    }

    #[tokio::test]
    async fn unregistered_warehouse_edge_resolves_to_null() {
        let schema = schema();
        execute(
            &schema,
            r#"mutation { updateStock(input: { productId: "P001", warehouseId: "GHOST", quantityChange: 1 }) { stock } }"#,
        )
        .await;

        let data = execute(
            &schema,
            r#"query { getInventoryByWarehouse(warehouseId: "GHOST") { stock warehouse { id } } }"#,
        )
        .await;
        assert_eq!(data["getInventoryByWarehouse"][0]["stock"], 1);
        assert!(data["getInventoryByWarehouse"][0]["warehouse"].is_null());
    }
}
