//! Default-value translation

use serde_json::Value;
use tracing::warn;

/// Nesting bound for declared defaults. Anything deeper is treated as a
/// recoverable conversion failure and the `default` key is omitted.
const MAX_DEPTH: usize = 64;

/// Convert a field's declared default into the value emitted under
/// `default`.
///
/// Returns `None` when the value cannot be converted; the caller then
/// leaves the key out. A successfully converted JSON `null` is a real
/// value and is emitted, not omitted.
pub fn convert_default(field: &str, raw: &Value) -> Option<Value> {
    match normalize(raw, 0) {
        Ok(value) => Some(value),
        Err(depth) => {
            warn!(field, depth, "default value too deeply nested, omitting");
            None
        }
    }
}

fn normalize(value: &Value, depth: usize) -> Result<Value, usize> {
    if depth > MAX_DEPTH {
        return Err(depth);
    }

    let converted = match value {
        Value::Null | Value::Bool(_) | Value::String(_) => value.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else if let Some(f) = n.as_f64() {
                Value::from(f)
            } else {
                value.clone()
            }
        }
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(normalize(item, depth + 1)?);
            }
            Value::Array(out)
        }
        Value::Object(entries) => {
            let mut out = serde_json::Map::new();
            for (key, item) in entries {
                out.insert(key.clone(), normalize(item, depth + 1)?);
            }
            Value::Object(out)
        }
    };

    Ok(converted)
}
