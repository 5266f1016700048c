//! Dotted-path access over `serde_json::Value`.
//!
//! Field paths use `.` as the segment separator (`"owner.email"`). These
//! helpers only traverse objects; array indexing is not a supported path
//! syntax.

use serde_json::{Map, Value};

/// Reads the value at a dotted path. Returns `None` if any segment is
/// missing or a non-object is hit mid-path.
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Writes `new` at a dotted path, creating intermediate objects as needed.
/// A non-object intermediate is replaced by an object.
pub fn set_path(value: &mut Value, path: &str, new: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = value;

    while let Some(segment) = segments.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let map = current
            .as_object_mut()
            .expect("just replaced with an object");

        if segments.peek().is_none() {
            map.insert(segment.to_string(), new);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

/// Removes the value at a dotted path, returning it if present.
/// Intermediate objects are left in place even when emptied.
pub fn remove_path(value: &mut Value, path: &str) -> Option<Value> {
    let mut segments = path.split('.').peekable();
    let mut current = value;

    while let Some(segment) = segments.next() {
        let map = current.as_object_mut()?;
        if segments.peek().is_none() {
            return map.remove(segment);
        }
        current = map.get_mut(segment)?;
    }
    None
}

/// Builds an object containing only the listed fields of `value`.
/// Fields absent from `value` are omitted from the result, so the picked
/// object never contains explicit nulls standing in for missing data.
pub fn pick(value: &Value, fields: &[String]) -> Value {
    let mut result = Value::Object(Map::new());
    for field in fields {
        if let Some(found) = get_path(value, field) {
            set_path(&mut result, field, found.clone());
        }
    }
    result
}
