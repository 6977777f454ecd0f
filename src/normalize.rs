//! Vendor wrapper unwrapping
//!
//! Some exports deliver a collection as `[{ "_secure_policy_rule": [ ... ] }]`
//! instead of the row list itself. [`normalize`] resolves one level of that
//! wrapper; nested wrappers are left as they are.

use crate::value::ConfigValue;

/// Flatten a collection into its record rows
///
/// Returns `None` for anything that is not a collection.
pub fn normalize(value: &ConfigValue) -> Option<Vec<ConfigValue>> {
    let items = value.as_collection()?;

    if let Some(ConfigValue::Record(first)) = items.first() {
        let wrapped = first.values().find_map(|v| match v {
            ConfigValue::Collection(rows) if !rows.is_empty() => Some(rows),
            _ => None,
        });
        if let Some(rows) = wrapped {
            return Some(rows.clone());
        }
    }

    Some(items.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn value(v: serde_json::Value) -> ConfigValue {
        ConfigValue::from(v)
    }

    #[test]
    fn test_not_a_collection() {
        assert_eq!(normalize(&value(json!({ "a": 1 }))), None);
        assert_eq!(normalize(&value(json!("x"))), None);
    }

    #[test]
    fn test_empty_collection() {
        assert_eq!(normalize(&value(json!([]))), Some(vec![]));
    }

    #[test]
    fn test_unwraps_vendor_wrapper() {
        let wrapped = value(json!([{
            "_secure_policy_rule": [
                { "_name": "r1" },
                { "_name": "r2" }
            ]
        }]));
        let rows = normalize(&wrapped).unwrap();
        assert_eq!(rows, vec![value(json!({ "_name": "r1" })), value(json!({ "_name": "r2" }))]);
    }

    #[test]
    fn test_skips_empty_inner_collections() {
        let wrapped = value(json!([{
            "empty": [],
            "rules": [{ "name": "r1" }]
        }]));
        assert_eq!(normalize(&wrapped).unwrap(), vec![value(json!({ "name": "r1" }))]);
    }

    #[test]
    fn test_row_shaped_collection_unchanged() {
        let rows = value(json!([
            { "name": "wan1", "ip": "203.0.113.1" },
            { "name": "lan1", "ip": "192.168.1.1" }
        ]));
        assert_eq!(normalize(&rows), rows.as_collection().map(|r| r.to_vec()));
    }

    #[test]
    fn test_only_one_level_unwrapped() {
        let nested = value(json!([{ "outer": [{ "inner": [{ "name": "r1" }] }] }]));
        assert_eq!(normalize(&nested).unwrap(), vec![value(json!({ "inner": [{ "name": "r1" }] }))]);
    }
}
