//! Tracing/logging setup shared by the binary and tests.

use tracing_subscriber::EnvFilter;

/// Initialize process-wide tracing: JSON lines, filtered via `RUST_LOG`
/// (default `info`, with sqlx's per-statement logging turned down).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
