//! Postgres-backed inventory store.
//!
//! ## Transaction discipline
//!
//! `adjust_stock` is one transaction: materialize the row with stock 0 if
//! absent (`INSERT .. ON CONFLICT DO NOTHING`), read it back under
//! `SELECT .. FOR UPDATE`, apply the delta, write or roll back. The row lock
//! linearizes concurrent adjustments on the same key; different keys do not
//! block each other. The bound check runs on the locked value, so the second
//! of two racing adjustments always sees the first's committed result.
//!
//! ## Error mapping
//!
//! | SQLSTATE | Path | Mapped to |
//! |----------|------|-----------|
//! | `23505` (unique violation) | warehouse insert | `DuplicateWarehouse` |
//! | `23503` (foreign key) | inventory insert | `Storage` (the ledger itself does not validate warehouse ids; the schema's FK may still reject) |
//! | anything else, pool/timeout | any | `Storage` |

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;

use async_trait::async_trait;

use stockroom_core::{
    InventoryRecord, LedgerError, LedgerResult, NewWarehouse, StockKey, Warehouse,
};

use crate::config::StoreConfig;
use crate::InventoryStore;

/// Durable [`InventoryStore`] on a single Postgres instance.
///
/// Holds only the connection pool; every operation re-reads from the
/// database inside its own transaction. Clone is cheap (pool is an `Arc`
/// internally) and the pool is closed by dropping the last clone.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect and make sure the schema exists (idempotent).
    pub async fn connect(cfg: &StoreConfig) -> LedgerResult<Self> {
        let url = cfg
            .database_url
            .as_deref()
            .ok_or_else(|| LedgerError::storage("DATABASE_URL is not set"))?;

        let timeout_ms = cfg.statement_timeout.as_millis().to_string();
        let options = PgConnectOptions::from_str(url)
            .map_err(|e| LedgerError::storage(format!("invalid DATABASE_URL: {e}")))?
            .options([("statement_timeout", timeout_ms.as_str())]);

        let pool = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(cfg.statement_timeout)
            .connect_with(options)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Wrap an existing pool (tests, callers that manage their own pool).
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the warehouses/inventory tables if they are missing, matching
    /// the conceptual schema: `warehouses(id PK, ..)` and
    /// `inventory(product_id, warehouse_id, stock, updated_at)` with a
    /// composite primary key and an FK to warehouses.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> LedgerResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS warehouses (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                location TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS inventory (
                product_id TEXT NOT NULL,
                warehouse_id TEXT NOT NULL REFERENCES warehouses (id),
                stock BIGINT NOT NULL CHECK (stock >= 0),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (product_id, warehouse_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;

        Ok(())
    }
}

#[async_trait]
impl InventoryStore for PostgresStore {
    #[instrument(
        skip(self, key),
        fields(product_id = key.product_id(), warehouse_id = key.warehouse_id()),
        err
    )]
    async fn adjust_stock(&self, key: &StockKey, delta: i64) -> LedgerResult<InventoryRecord> {
        let now = Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        // Absence is "record not yet created": materialize it with stock 0
        // inside the same transaction as the bound check. The FK on
        // warehouse_id may reject unknown warehouses at the database level.
        sqlx::query(
            r#"
            INSERT INTO inventory (product_id, warehouse_id, stock, updated_at)
            VALUES ($1, $2, 0, $3)
            ON CONFLICT (product_id, warehouse_id) DO NOTHING
            "#,
        )
        .bind(key.product_id())
        .bind(key.warehouse_id())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("materialize_record", e))?;

        let row = sqlx::query(
            r#"
            SELECT stock FROM inventory
            WHERE product_id = $1 AND warehouse_id = $2
            FOR UPDATE
            "#,
        )
        .bind(key.product_id())
        .bind(key.warehouse_id())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("lock_record", e))?;

        let stock: i64 = row
            .try_get("stock")
            .map_err(|e| LedgerError::storage(format!("failed to read stock: {e}")))?;

        let new_stock = match key.apply_delta(stock, delta) {
            Ok(v) => v,
            Err(err) => {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(err);
            }
        };

        sqlx::query(
            r#"
            UPDATE inventory
            SET stock = $3, updated_at = $4
            WHERE product_id = $1 AND warehouse_id = $2
            "#,
        )
        .bind(key.product_id())
        .bind(key.warehouse_id())
        .bind(new_stock)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("write_stock", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        Ok(InventoryRecord {
            product_id: key.product_id().to_string(),
            warehouse_id: key.warehouse_id().to_string(),
            stock: new_stock,
            updated_at: now,
        })
    }

    #[instrument(skip(self, warehouse), fields(warehouse_id = %warehouse.id), err)]
    async fn create_warehouse(&self, warehouse: NewWarehouse) -> LedgerResult<Warehouse> {
        let now = Utc::now();

        // No existence pre-check: the primary key on `id` is the
        // authoritative uniqueness enforcement.
        sqlx::query(
            r#"
            INSERT INTO warehouses (id, name, location, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            "#,
        )
        .bind(&warehouse.id)
        .bind(&warehouse.name)
        .bind(&warehouse.location)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                LedgerError::DuplicateWarehouse(warehouse.id.clone())
            } else {
                map_sqlx_error("create_warehouse", e)
            }
        })?;

        Ok(Warehouse {
            id: warehouse.id,
            name: warehouse.name,
            location: warehouse.location,
            created_at: now,
            updated_at: now,
        })
    }

    #[instrument(skip(self), err)]
    async fn list_warehouses(&self) -> LedgerResult<Vec<Warehouse>> {
        let rows = sqlx::query(
            "SELECT id, name, location, created_at, updated_at FROM warehouses",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_warehouses", e))?;

        rows.iter().map(warehouse_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn warehouse_by_id(&self, id: &str) -> LedgerResult<Option<Warehouse>> {
        let row = sqlx::query(
            "SELECT id, name, location, created_at, updated_at FROM warehouses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("warehouse_by_id", e))?;

        row.as_ref().map(warehouse_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn inventory_by_product(&self, product_id: &str) -> LedgerResult<Vec<InventoryRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, warehouse_id, stock, updated_at
            FROM inventory
            WHERE product_id = $1
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("inventory_by_product", e))?;

        rows.iter().map(record_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn inventory_by_warehouse(
        &self,
        warehouse_id: &str,
    ) -> LedgerResult<Vec<InventoryRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, warehouse_id, stock, updated_at
            FROM inventory
            WHERE warehouse_id = $1
            "#,
        )
        .bind(warehouse_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("inventory_by_warehouse", e))?;

        rows.iter().map(record_from_row).collect()
    }
}

fn warehouse_from_row(row: &PgRow) -> LedgerResult<Warehouse> {
    Ok(Warehouse {
        id: get(row, "id")?,
        name: get(row, "name")?,
        location: get(row, "location")?,
        created_at: get::<DateTime<Utc>>(row, "created_at")?,
        updated_at: get::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn record_from_row(row: &PgRow) -> LedgerResult<InventoryRecord> {
    Ok(InventoryRecord {
        product_id: get(row, "product_id")?,
        warehouse_id: get(row, "warehouse_id")?,
        stock: get(row, "stock")?,
        updated_at: get::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn get<'r, T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>>(
    row: &'r PgRow,
    column: &str,
) -> LedgerResult<T> {
    row.try_get(column)
        .map_err(|e| LedgerError::storage(format!("failed to read column '{column}': {e}")))
}

/// Map sqlx errors onto the infrastructure error. Business-rule mappings
/// (unique violation on the warehouse insert) are handled at the call site.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> LedgerError {
    match err {
        sqlx::Error::Database(db_err) => LedgerError::storage(format!(
            "database error in {operation}: {}",
            db_err.message()
        )),
        sqlx::Error::PoolClosed => {
            LedgerError::storage(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            LedgerError::storage(format!("connection acquire timed out in {operation}"))
        }
        other => LedgerError::storage(format!("sqlx error in {operation}: {other}")),
    }
}

/// SQLSTATE 23505.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}
