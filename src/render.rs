use serde_json::{Map, Number};
use sha2::{Digest, Sha256};

use crate::errors::{ExportError, Result};
use crate::value::Value;

/// Serialize a concrete value to canonical JSON and digest the exact bytes.
/// Struct fields keep their declaration order (serde_json's ordered maps);
/// any byte difference in the rendering changes the digest.
pub fn render(value: &Value) -> Result<(String, String)> {
    let json = to_json(value)?;
    let rendered =
        serde_json::to_string(&json).map_err(|e| ExportError::Marshal(e.to_string()))?;
    let id = digest(rendered.as_bytes());
    Ok((rendered, id))
}

/// Hex-encoded SHA-256 of the rendered bytes, used as an opaque identifier.
pub fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn to_json(value: &Value) -> Result<serde_json::Value> {
    match value.resolved() {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Int(i) => Ok(serde_json::Value::Number((*i).into())),
        Value::Float(f) => Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| ExportError::Marshal(format!("non-finite float {f}"))),
        Value::String(s) => Ok(serde_json::Value::String(s.clone())),
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(to_json(item)?);
            }
            Ok(serde_json::Value::Array(out))
        }
        Value::Struct(fields) => {
            let mut out = Map::new();
            for field in fields.iter().filter(|f| !f.hidden) {
                out.insert(field.name.clone(), to_json(&field.value)?);
            }
            Ok(serde_json::Value::Object(out))
        }
        // Validation runs before rendering, so these only appear if a
        // caller skips it.
        other => Err(ExportError::Marshal(format!(
            "cannot marshal non-concrete value ({})",
            other.describe()
        ))),
    }
}
