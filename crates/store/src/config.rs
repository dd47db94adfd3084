//! Store configuration, read from the environment at startup.

use std::time::Duration;

/// Connection target and limits for the storage layer.
///
/// `database_url` absent means "run the in-memory backend" (dev/test mode);
/// the caller is expected to log that fallback loudly.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: Option<String>,
    pub statement_timeout: Duration,
    pub max_connections: u32,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            statement_timeout: Duration::from_millis(env_u64(
                "STATEMENT_TIMEOUT_MS",
                DEFAULT_STATEMENT_TIMEOUT_MS,
            )),
            max_connections: env_u64("DATABASE_MAX_CONNECTIONS", 5) as u32,
        }
    }
}

const DEFAULT_STATEMENT_TIMEOUT_MS: u64 = 5_000;

fn env_u64(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("{name}={raw} is not a valid integer; using default {default}");
            default
        }),
        Err(_) => default,
    }
}
