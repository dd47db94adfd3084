use serde::Deserialize;

/// Body of `POST /inventory/update`. `quantity_change` is taken as raw JSON
/// and parsed leniently (number or numeric string), matching the gateway's
/// historical parse-to-integer contract; anything else is a 400 and nothing
/// is dispatched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStockRequest {
    pub product_id: String,
    pub warehouse_id: String,
    pub quantity_change: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWarehouseRequest {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
}

/// Accepts `5`, `-3`, or `"42"`; rejects floats, booleans, and non-numeric
/// strings.
pub fn parse_quantity_change(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quantity_change_parses_numbers_and_numeric_strings() {
        assert_eq!(parse_quantity_change(&json!(5)), Some(5));
        assert_eq!(parse_quantity_change(&json!(-30)), Some(-30));
        assert_eq!(parse_quantity_change(&json!("42")), Some(42));
        assert_eq!(parse_quantity_change(&json!(" -7 ")), Some(-7));
    }

    #[test]
    fn quantity_change_rejects_non_integers() {
        assert_eq!(parse_quantity_change(&json!("abc")), None);
        assert_eq!(parse_quantity_change(&json!(1.5)), None);
        assert_eq!(parse_quantity_change(&json!(true)), None);
        assert_eq!(parse_quantity_change(&json!(null)), None);
    }
}
