//! Key paths into configuration documents
//!
//! Paths use the notation the diff reports in: record keys joined with `.`,
//! collection positions as `[i]`. `firewall_rules[2].action` names the
//! `action` field of the third rule.

use crate::value::ConfigValue;

/// Flatten a document into `(path, leaf)` pairs in document order
///
/// Only non-container values are leaves; empty records and collections
/// contribute nothing. A scalar document flattens to a single pair with an
/// empty path.
pub fn flatten(value: &ConfigValue) -> Vec<(String, &ConfigValue)> {
    let mut leaves = Vec::new();
    flatten_into(value, String::new(), &mut leaves);
    leaves
}

fn flatten_into<'a>(value: &'a ConfigValue, prefix: String, leaves: &mut Vec<(String, &'a ConfigValue)>) {
    match value {
        ConfigValue::Record(record) => {
            for (key, child) in record.iter() {
                let path = if prefix.is_empty() {
                    key.to_string()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(child, path, leaves);
            }
        }
        ConfigValue::Collection(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(child, format!("{}[{}]", prefix, index), leaves);
            }
        }
        ConfigValue::Scalar(_) => leaves.push((prefix, value)),
    }
}

/// Look up the value at a key path
///
/// Returns `None` when a segment names a missing key, an out-of-range index,
/// or steps into a scalar. The empty path resolves to the document itself.
/// Keys that themselves contain `.` or `[` cannot be addressed.
pub fn resolve_path<'a>(value: &'a ConfigValue, path: &str) -> Option<&'a ConfigValue> {
    if path.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for segment in path.split('.') {
        let (key, mut indexes) = match segment.find('[') {
            Some(pos) => segment.split_at(pos),
            None => (segment, ""),
        };
        if !key.is_empty() {
            current = current.as_record()?.get(key)?;
        }
        while let Some(rest) = indexes.strip_prefix('[') {
            let (index, tail) = rest.split_once(']')?;
            current = current.as_collection()?.get(index.parse::<usize>().ok()?)?;
            indexes = tail;
        }
        if !indexes.is_empty() {
            return None;
        }
    }
    Some(current)
}
