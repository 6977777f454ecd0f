//! Recursive merge of a partial patch into a configuration document
//!
//! This is the operation a device applies when it receives a configuration
//! patch. It is exposed so a write can be previewed and diffed before it is
//! sent.

use crate::value::{ConfigValue, Record};

/// Merge `patch` into `base`, returning a new document
///
/// Records merge key by key, recursing where both sides hold a record. Any
/// other patch value replaces the base value outright, collections included.
pub fn apply_patch(base: &ConfigValue, patch: &ConfigValue) -> ConfigValue {
    match (base, patch) {
        (ConfigValue::Record(base), ConfigValue::Record(patch)) => {
            ConfigValue::Record(merge_records(base, patch))
        }
        _ => patch.clone(),
    }
}

fn merge_records(base: &Record, patch: &Record) -> Record {
    let mut merged = base.clone();
    for (key, value) in patch.iter() {
        let next = match (merged.get(key), value) {
            (Some(current @ ConfigValue::Record(_)), ConfigValue::Record(_)) => apply_patch(current, value),
            _ => value.clone(),
        };
        merged.insert(key, next);
    }
    merged
}
