//! `stockroom-graphql` — the unified operation facade.
//!
//! Both protocol surfaces ultimately dispatch through the [`StockroomSchema`]
//! built here: remote GraphQL clients via the `/graphql` route, and the REST
//! gateway by executing the same requests in-process. The resolvers are thin
//! dispatch over [`InventoryStore`]; all business rules live below them.

pub mod schema;
pub mod types;

use std::sync::Arc;

use async_graphql::{EmptySubscription, Schema};

use stockroom_store::InventoryStore;

pub use schema::{MutationRoot, QueryRoot};
pub use types::{CreateWarehouseInput, Inventory, UpdateStockInput, Warehouse};

pub type StockroomSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema with the store injected as context data.
pub fn build_schema(store: Arc<dyn InventoryStore>) -> StockroomSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(store)
        .finish()
}
