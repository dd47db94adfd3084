//! Storage backend selection.

use std::sync::Arc;

use stockroom_store::{InMemoryStore, InventoryStore, PostgresStore, StoreConfig};

/// Build the store from the environment: Postgres when `DATABASE_URL` is
/// set, otherwise the in-memory backend (dev/test mode, non-durable).
pub async fn build_store() -> Arc<dyn InventoryStore> {
    let cfg = StoreConfig::from_env();

    if cfg.database_url.is_some() {
        let store = PostgresStore::connect(&cfg)
            .await
            .expect("failed to connect to Postgres");
        tracing::info!("using postgres store");
        Arc::new(store)
    } else {
        tracing::warn!("DATABASE_URL not set; using non-durable in-memory store");
        Arc::new(InMemoryStore::new())
    }
}
