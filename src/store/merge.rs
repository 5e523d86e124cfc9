//! Structural merge of a partial document into an existing node.

use serde_json::Value;

/// Merge `partial` into `target`.
///
/// Objects are merged key by key and recursively when both sides hold the
/// same kind of container. Arrays are concatenated. A `null` in `partial`
/// never overwrites an existing value, but is added when the key is new.
/// Any other value overwrites.
pub fn merge_value(target: &mut Value, partial: &Value) {
    match (target, partial) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(key) {
                    Some(current) if same_container(current, value) => merge_value(current, value),
                    Some(_) if value.is_null() => {}
                    Some(current) => *current = value.clone(),
                    None => {
                        existing.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (Value::Array(existing), Value::Array(incoming)) => {
            existing.extend(incoming.iter().cloned());
        }
        (target, partial) => {
            if !partial.is_null() {
                *target = partial.clone();
            }
        }
    }
}

fn same_container(a: &Value, b: &Value) -> bool {
    matches!(
        (a, b),
        (Value::Object(_), Value::Object(_)) | (Value::Array(_), Value::Array(_))
    )
}
