pub mod developers;
pub mod gamelogs;
pub mod games;
pub mod rooms;
pub mod users;

use gamecore_protocol::entities::Id;
use serde_json::Value;

use crate::error::CatalogError;

pub(crate) fn require_id(data: &Value) -> Result<Id, CatalogError> {
    data.get("id")
        .and_then(Value::as_u64)
        .map(|id| id as Id)
        .ok_or_else(|| CatalogError::Validation("missing required field `id`".to_string()))
}

pub(crate) fn require_str<'a>(data: &'a Value, field: &str) -> Result<&'a str, CatalogError> {
    data.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| CatalogError::Validation(format!("missing required field `{field}`")))
}

/// Generic conjunctive filter: a row matches a query if every key present
/// in `filter` is present on the row's JSON representation with an equal
/// value. Mirrors the source's plain per-field equality query semantics.
pub(crate) fn matches_filter(row: &Value, filter: &Value) -> bool {
    let Some(filter_obj) = filter.as_object() else {
        return true;
    };
    let Some(row_obj) = row.as_object() else {
        return false;
    };
    filter_obj
        .iter()
        .all(|(key, expected)| row_obj.get(key) == Some(expected))
}
