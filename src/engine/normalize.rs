//! Normalization of raw backend items into findings.

use crate::core::{kind, Finding, NormalizeError};

use serde_json::{Map, Value};

/// Maximum number of findings kept from one engine run.
pub const MAX_FINDINGS: usize = 50;

/// Normalizes at most `cap` items, in order.
///
/// Items past the cap are dropped without being inspected, so a malformed
/// item beyond it cannot fail the run.
pub fn normalize_items(items: Vec<Value>, cap: usize) -> Result<Vec<Finding>, NormalizeError> {
    items
        .iter()
        .take(cap)
        .enumerate()
        .map(|(index, item)| normalize_item(index, item))
        .collect()
}

/// Normalizes one item.
///
/// Field precedence: `type` (default `result`), `detail` then `title`
/// (default empty), `location` then `url` (default `N/A`). A `null` value
/// counts as absent.
pub fn normalize_item(index: usize, item: &Value) -> Result<Finding, NormalizeError> {
    let object = item.as_object().ok_or(NormalizeError::NotAnObject {
        index,
        found: json_type(item),
    })?;

    Ok(Finding::new(
        field(object, &["type"]).unwrap_or_else(|| kind::RESULT.to_string()),
        field(object, &["detail", "title"]).unwrap_or_default(),
        field(object, &["location", "url"]).unwrap_or_else(|| Finding::NO_LOCATION.to_string()),
    ))
}

fn field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
        .map(stringify)
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
