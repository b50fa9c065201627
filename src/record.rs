//! Ordered records and dotted-path access.
//!
//! A [`Record`] is an insertion-ordered mapping from field name to JSON
//! value. Ordering matters: the transform engine evaluates rule-set fields
//! in declaration order, and later fields may read earlier results.

use serde_json::Value;

/// An ordered field-name → value mapping.
///
/// `serde_json` is built with the `preserve_order` feature, so this map
/// keeps insertion order.
pub type Record = serde_json::Map<String, Value>;

/// Walk a dotted path (e.g. `"user.profile.email"`) through a value.
///
/// Integer segments index into arrays: `"items.0"` returns the first
/// element of the array at `items`.
///
/// Returns `None` when any segment is absent. A found `Value::Null` is a
/// hit, not a miss.
pub fn find_nested<'a>(path: &str, root: &'a Value) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Walk a dotted path starting from a record.
pub fn find_in_record<'a>(path: &str, record: &'a Record) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    let value = record.get(head)?;
    match rest {
        Some(rest) => find_nested(rest, value),
        None => Some(value),
    }
}

/// Flatten a value into a record of dotted keys.
///
/// Nested objects and arrays contribute `parent.child` / `parent.0` keys;
/// scalar leaves keep their value. Used to prepare placeholder replacement
/// data for templates.
pub fn flatten(value: &Value) -> Record {
    let mut flat = Record::new();
    flatten_into(value, String::new(), &mut flat);
    flat
}

fn flatten_into(value: &Value, prefix: String, out: &mut Record) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(child, path, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let path = if prefix.is_empty() {
                    index.to_string()
                } else {
                    format!("{}.{}", prefix, index)
                };
                flatten_into(child, path, out);
            }
        }
        leaf => {
            if !prefix.is_empty() {
                out.insert(prefix, leaf.clone());
            }
        }
    }
}

/// Convert a JSON object value into a [`Record`], or an empty record for
/// any other shape.
pub fn to_record(value: &Value) -> Record {
    match value {
        Value::Object(map) => map.clone(),
        _ => Record::new(),
    }
}
