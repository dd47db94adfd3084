use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// HTTP status for a facade error code. Codes come from
/// `LedgerError::code` via the GraphQL `code` extension.
pub fn status_for_code(code: &str) -> StatusCode {
    match code {
        "validation_error" => StatusCode::BAD_REQUEST,
        "duplicate_warehouse" => StatusCode::CONFLICT,
        "insufficient_stock" => StatusCode::UNPROCESSABLE_ENTITY,
        "gateway_timeout" => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Translate a GraphQL error from the facade dispatch into a REST response,
/// using the `code` extension when present (anything without one is treated
/// as a storage-level failure).
pub fn graphql_error_response(err: &async_graphql::ServerError) -> axum::response::Response {
    let serialized = serde_json::to_value(err).unwrap_or_default();
    let code = serialized
        .get("extensions")
        .and_then(|ext| ext.get("code"))
        .and_then(|c| c.as_str())
        .unwrap_or("storage_error")
        .to_string();
    let status = status_for_code(&code);
    json_error(status, code, err.message.clone())
}

pub fn json_error(
    status: StatusCode,
    code: impl Into<String>,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        Json(json!({
            "error": code.into(),
            "message": message.into(),
        })),
    )
        .into_response()
}
