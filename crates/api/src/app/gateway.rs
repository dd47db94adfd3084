//! REST gateway: five HTTP endpoints translated into the facade's GraphQL
//! operations.
//!
//! Each handler builds the same request a remote GraphQL client would send
//! (query text + variables) and executes it on the shared in-process schema,
//! so the REST surface exercises exactly one dispatch path with the graph
//! surface. The dispatch runs under a bounded timeout; expiry surfaces as
//! 504 rather than masquerading as a data error.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use async_graphql::Variables;
use stockroom_core::LedgerError;

use crate::app::{dto, errors, AppState};

pub fn router() -> Router {
    Router::new()
        .route("/warehouses", get(get_all_warehouses).post(create_warehouse))
        .route("/inventory/product/:product_id", get(get_inventory_by_product))
        .route("/inventory/warehouse/:warehouse_id", get(get_inventory_by_warehouse))
        .route("/inventory/update", post(update_stock))
}

const GET_ALL_WAREHOUSES: &str = r#"
    query GetAllWarehouses {
        getAllWarehouses {
            id
            name
            location
            createdAt
            updatedAt
        }
    }
"#;

const GET_INVENTORY_BY_PRODUCT: &str = r#"
    query GetInventoryByProduct($productId: String!) {
        getInventoryByProduct(productId: $productId) {
            productId
            warehouseId
            stock
            updatedAt
            warehouse {
                id
                name
                location
            }
        }
    }
"#;

const GET_INVENTORY_BY_WAREHOUSE: &str = r#"
    query GetInventoryByWarehouse($warehouseId: String!) {
        getInventoryByWarehouse(warehouseId: $warehouseId) {
            productId
            warehouseId
            stock
            updatedAt
            warehouse {
                id
                name
                location
            }
        }
    }
"#;

const UPDATE_STOCK: &str = r#"
    mutation UpdateStock($input: UpdateStockInput!) {
        updateStock(input: $input) {
            productId
            warehouseId
            stock
            updatedAt
            warehouse {
                id
                name
                location
            }
        }
    }
"#;

const CREATE_WAREHOUSE: &str = r#"
    mutation CreateWarehouse($input: CreateWarehouseInput!) {
        createWarehouse(input: $input) {
            id
            name
            location
            createdAt
            updatedAt
        }
    }
"#;

/// Execute one facade operation and unwrap the data envelope. A facade error
/// comes back as a ready-to-return REST response.
async fn dispatch(
    state: &AppState,
    query: &str,
    variables: serde_json::Value,
) -> Result<serde_json::Value, axum::response::Response> {
    let request = async_graphql::Request::new(query).variables(Variables::from_json(variables));

    let response = match tokio::time::timeout(state.gateway_timeout, state.schema.execute(request))
        .await
    {
        Ok(response) => response,
        Err(_) => {
            let err = LedgerError::GatewayTimeout;
            tracing::warn!("facade dispatch timed out");
            return Err(errors::json_error(
                StatusCode::GATEWAY_TIMEOUT,
                err.code(),
                err.to_string(),
            ));
        }
    };

    if let Some(err) = response.errors.first() {
        return Err(errors::graphql_error_response(err));
    }

    response.data.into_json().map_err(|e| {
        errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "storage_error",
            format!("facade returned malformed data: {e}"),
        )
    })
}

async fn get_all_warehouses(
    Extension(state): Extension<Arc<AppState>>,
) -> axum::response::Response {
    match dispatch(&state, GET_ALL_WAREHOUSES, serde_json::json!({})).await {
        Ok(mut data) => Json(data["getAllWarehouses"].take()).into_response(),
        Err(resp) => resp,
    }
}

async fn get_inventory_by_product(
    Extension(state): Extension<Arc<AppState>>,
    Path(product_id): Path<String>,
) -> axum::response::Response {
    let variables = serde_json::json!({ "productId": product_id });
    match dispatch(&state, GET_INVENTORY_BY_PRODUCT, variables).await {
        Ok(mut data) => Json(data["getInventoryByProduct"].take()).into_response(),
        Err(resp) => resp,
    }
}

async fn get_inventory_by_warehouse(
    Extension(state): Extension<Arc<AppState>>,
    Path(warehouse_id): Path<String>,
) -> axum::response::Response {
    let variables = serde_json::json!({ "warehouseId": warehouse_id });
    match dispatch(&state, GET_INVENTORY_BY_WAREHOUSE, variables).await {
        Ok(mut data) => Json(data["getInventoryByWarehouse"].take()).into_response(),
        Err(resp) => resp,
    }
}

async fn update_stock(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<dto::UpdateStockRequest>, JsonRejection>,
) -> axum::response::Response {
    // Undeserializable bodies get the same error shape as domain failures.
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                rejection.body_text(),
            )
        }
    };

    // Parse before dispatch: a malformed quantityChange must mutate nothing.
    let quantity_change = match dto::parse_quantity_change(&body.quantity_change) {
        Some(v) => v,
        None => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "quantityChange must be an integer",
            )
        }
    };

    let variables = serde_json::json!({
        "input": {
            "productId": body.product_id,
            "warehouseId": body.warehouse_id,
            "quantityChange": quantity_change,
        }
    });
    match dispatch(&state, UPDATE_STOCK, variables).await {
        Ok(mut data) => Json(data["updateStock"].take()).into_response(),
        Err(resp) => resp,
    }
}

async fn create_warehouse(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<dto::CreateWarehouseRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                rejection.body_text(),
            )
        }
    };

    let variables = serde_json::json!({
        "input": {
            "id": body.id,
            "name": body.name,
            // Absent location defaults to the empty string on this surface.
            "location": body.location.unwrap_or_default(),
        }
    });
    match dispatch(&state, CREATE_WAREHOUSE, variables).await {
        Ok(mut data) => {
            (StatusCode::CREATED, Json(data["createWarehouse"].take())).into_response()
        }
        Err(resp) => resp,
    }
}
