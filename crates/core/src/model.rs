use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// The (product, warehouse) pair identifying one inventory record.
///
/// Construction validates that both identifiers are non-empty; everything
/// downstream of a `StockKey` can assume well-formed ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockKey {
    product_id: String,
    warehouse_id: String,
}

impl StockKey {
    pub fn new(product_id: impl Into<String>, warehouse_id: impl Into<String>) -> LedgerResult<Self> {
        let product_id = product_id.into();
        let warehouse_id = warehouse_id.into();
        if product_id.trim().is_empty() {
            return Err(LedgerError::validation("product_id cannot be empty"));
        }
        if warehouse_id.trim().is_empty() {
            return Err(LedgerError::validation("warehouse_id cannot be empty"));
        }
        Ok(Self {
            product_id,
            warehouse_id,
        })
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn warehouse_id(&self) -> &str {
        &self.warehouse_id
    }

    /// Apply a signed delta to a current stock level, enforcing the
    /// non-negative invariant. Absence of a record reads as stock 0.
    ///
    /// This is the one place the floor-zero rule lives; both storage backends
    /// call it inside their atomic section.
    pub fn apply_delta(&self, stock: i64, delta: i64) -> LedgerResult<i64> {
        let new_stock = stock.checked_add(delta).ok_or_else(|| {
            LedgerError::validation(format!("stock adjustment overflows: {stock} + {delta}"))
        })?;
        if new_stock < 0 {
            return Err(LedgerError::InsufficientStock {
                product_id: self.product_id.clone(),
                warehouse_id: self.warehouse_id.clone(),
                stock,
                delta,
            });
        }
        Ok(new_stock)
    }
}

/// A storage location for stock. Created once, never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for warehouse creation. `name`/`location` are persisted
/// as given (no normalization).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWarehouse {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
}

impl NewWarehouse {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        location: Option<String>,
    ) -> LedgerResult<Self> {
        let id = id.into();
        let name = name.into();
        if id.trim().is_empty() {
            return Err(LedgerError::validation("warehouse id cannot be empty"));
        }
        if name.trim().is_empty() {
            return Err(LedgerError::validation("warehouse name cannot be empty"));
        }
        Ok(Self { id, name, location })
    }
}

/// Per-(product, warehouse) stock level. Lazily created with stock 0 on the
/// first adjustment that targets its key; never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub product_id: String,
    pub warehouse_id: String,
    pub stock: i64,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proptest::test_runner::TestCaseError;

    fn key() -> StockKey {
        StockKey::new("P001", "WH001").unwrap()
    }

    #[test]
    fn empty_ids_are_rejected() {
        assert!(matches!(
            StockKey::new("", "WH001"),
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            StockKey::new("P001", "  "),
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            NewWarehouse::new("WH001", "", None),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn delta_applies_against_zero_for_missing_records() {
        assert_eq!(key().apply_delta(0, 100).unwrap(), 100);
    }

    #[test]
    fn overdraw_reports_current_stock_and_delta() {
        let err = key().apply_delta(70, -1000).unwrap_err();
        match err {
            LedgerError::InsufficientStock { stock, delta, .. } => {
                assert_eq!(stock, 70);
                assert_eq!(delta, -1000);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_delta_is_accepted() {
        assert_eq!(key().apply_delta(70, 0).unwrap(), 70);
    }

    proptest! {
        // Accepted adjustments never yield a negative level, and the result
        // is exactly the running sum of the accepted deltas.
        #[test]
        fn committed_stock_is_sum_of_accepted_deltas(deltas in proptest::collection::vec(-500i64..500, 0..64)) {
            let key = key();
            let mut stock = 0i64;
            let mut accepted = 0i64;
            for delta in deltas {
                match key.apply_delta(stock, delta) {
                    Ok(next) => {
                        stock = next;
                        accepted += delta;
                    }
                    Err(LedgerError::InsufficientStock { stock: reported, .. }) => {
                        // Failed adjustment leaves the level untouched.
                        prop_assert_eq!(reported, stock);
                    }
                    Err(other) => return Err(TestCaseError::fail(format!("{other:?}"))),
                }
                prop_assert!(stock >= 0);
                prop_assert_eq!(stock, accepted);
            }
        }
    }
}
