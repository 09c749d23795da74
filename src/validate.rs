use crate::errors::{ExportError, Result};
use crate::value::Value;

/// Check that a value is concrete and final: every visible field resolves
/// to exactly one scalar, list, or struct, with no type constraints, no
/// defaultless disjunctions, and no `_` left anywhere. Runs once per
/// request, on the narrowed value when a path was given.
pub fn validate(value: &Value) -> Result<()> {
    let mut path = Vec::new();
    walk(value, &mut path)
}

fn walk(value: &Value, path: &mut Vec<String>) -> Result<()> {
    match value {
        Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_) => Ok(()),
        Value::List(items) => {
            for (i, item) in items.iter().enumerate() {
                path.push(i.to_string());
                walk(item, path)?;
                path.pop();
            }
            Ok(())
        }
        Value::Struct(fields) => {
            // Hidden fields are not part of the exported document and are
            // allowed to stay unresolved.
            for field in fields.iter().filter(|f| !f.hidden) {
                path.push(field.name.clone());
                walk(&field.value, path)?;
                path.pop();
            }
            Ok(())
        }
        Value::Type(k) => Err(incomplete(path, &format!("incomplete value ({k})"))),
        Value::Top => Err(incomplete(path, "incomplete value (_)")),
        Value::Disjunction { branches, default } => match default.and_then(|i| branches.get(i)) {
            Some(chosen) => walk(chosen, path),
            None => Err(incomplete(
                path,
                &format!("unresolved disjunction of {} branches", branches.len()),
            )),
        },
    }
}

fn incomplete(path: &[String], what: &str) -> ExportError {
    if path.is_empty() {
        ExportError::Validate(what.to_string())
    } else {
        ExportError::Validate(format!("field {}: {what}", path.join(".")))
    }
}
