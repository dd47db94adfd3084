//! HTTP application wiring (axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: storage backend selection (Postgres vs in-memory)
//! - `gateway.rs`: the five REST routes, each translated into a GraphQL
//!   request executed on the in-process schema
//! - `dto.rs`: REST request bodies
//! - `errors.rs`: consistent JSON error responses + status mapping

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;

use stockroom_graphql::{build_schema, StockroomSchema};
use stockroom_store::InventoryStore;

pub mod dto;
pub mod errors;
pub mod gateway;
pub mod services;

/// Shared handler state: the facade schema plus the gateway's dispatch
/// timeout. Both protocol surfaces execute against the same schema instance.
pub struct AppState {
    pub schema: StockroomSchema,
    pub gateway_timeout: Duration,
}

/// Build the full router with the environment-selected storage backend
/// (public entrypoint used by `main.rs`).
pub async fn build_app() -> Router {
    build_app_with_store(services::build_store().await)
}

/// Build the router on an explicit store (tests inject the in-memory one).
pub fn build_app_with_store(store: Arc<dyn InventoryStore>) -> Router {
    build_app_with_timeout(store, gateway_timeout_from_env())
}

/// Build the router with an explicit gateway dispatch timeout instead of the
/// environment's (tests pin it to force the expiry path).
pub fn build_app_with_timeout(
    store: Arc<dyn InventoryStore>,
    gateway_timeout: Duration,
) -> Router {
    let state = Arc::new(AppState {
        schema: build_schema(store),
        gateway_timeout,
    });

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/graphql", post(graphql))
        .merge(gateway::router())
        .layer(Extension(state))
        .layer(ServiceBuilder::new())
}

fn gateway_timeout_from_env() -> Duration {
    const DEFAULT_MS: u64 = 10_000;
    let ms = match std::env::var("GATEWAY_TIMEOUT_MS") {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("GATEWAY_TIMEOUT_MS={raw} is not a valid integer; using {DEFAULT_MS}");
            DEFAULT_MS
        }),
        Err(_) => DEFAULT_MS,
    };
    Duration::from_millis(ms)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Welcome to the Stockroom API",
        "graphql_endpoint": "/graphql",
        "rest_endpoints": "Available at /warehouses, /inventory/product/{id}, /inventory/warehouse/{id}",
    }))
}

/// The GraphQL endpoint itself: deserialize the request body into an
/// `async_graphql::Request` and execute it on the shared schema. The REST
/// gateway goes through the exact same `Schema::execute` dispatch.
async fn graphql(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<serde_json::Value>, axum::extract::rejection::JsonRejection>,
) -> axum::response::Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                rejection.body_text(),
            )
        }
    };
    let request: async_graphql::Request = match serde_json::from_value(payload) {
        Ok(r) => r,
        Err(e) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("invalid graphql request: {e}"),
            )
        }
    };
    Json(state.schema.execute(request).await).into_response()
}
