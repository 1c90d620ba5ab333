//! Model listing payloads

use serde_json::Value;

/// Model identifiers from a `GET /models` payload.
///
/// Shapes other than `{"data": [{"id": ...}, ...]}` degrade to an empty
/// list; entries without a string `id` are skipped.
pub fn model_ids(payload: &Value) -> Vec<String> {
    payload
        .get("data")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("id").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
