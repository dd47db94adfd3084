//! Domain error model.

use thiserror::Error;

/// Result type used across the ledger and its callers.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors produced by the ledger, the registry, and the storage layer.
///
/// Business-rule failures (`InsufficientStock`, `DuplicateWarehouse`,
/// `Validation`) are deterministic and never retried; `Storage` is an
/// infrastructure failure the caller may retry with backoff; `GatewayTimeout`
/// marks a facade dispatch that did not complete, distinct from a rejection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Applying the delta would drive stock below zero. Nothing was written.
    #[error(
        "insufficient stock for product '{product_id}' in warehouse '{warehouse_id}': \
         have {stock}, requested change {delta}"
    )]
    InsufficientStock {
        product_id: String,
        warehouse_id: String,
        stock: i64,
        delta: i64,
    },

    /// A warehouse with this id already exists.
    #[error("warehouse '{0}' already exists")]
    DuplicateWarehouse(String),

    /// A value failed validation (e.g. empty identifier).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Infrastructure failure (connection, lock/statement timeout,
    /// unclassified constraint violation). The transaction was aborted.
    #[error("storage error: {0}")]
    Storage(String),

    /// The gateway's in-process facade dispatch timed out.
    #[error("gateway timed out waiting for the facade")]
    GatewayTimeout,
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Stable machine-readable code, used as the GraphQL error extension and
    /// as the REST error body's `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::DuplicateWarehouse(_) => "duplicate_warehouse",
            Self::Validation(_) => "validation_error",
            Self::Storage(_) => "storage_error",
            Self::GatewayTimeout => "gateway_timeout",
        }
    }
}
