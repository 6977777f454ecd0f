//! Configuration value model
//!
//! Every document the engine sees is a [`ConfigValue`]: a scalar, an ordered
//! record, or an ordered collection. Records keep their keys in insertion
//! order, which is also the order used by [`ConfigValue::canonical_string`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A leaf value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

/// Ordered key-value record
///
/// Keys are unique; inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, ConfigValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, keeping the original position of an existing key
    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &ConfigValue> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ConfigValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, ConfigValue)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Top-level shape of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Scalar,
    Record,
    Collection,
}

impl Shape {
    /// Noun used in validation messages
    pub fn describe(&self) -> &'static str {
        match self {
            Shape::Scalar => "a scalar value",
            Shape::Record => "an object",
            Shape::Collection => "an array",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::Scalar => "scalar",
            Shape::Record => "record",
            Shape::Collection => "collection",
        };
        write!(f, "{}", name)
    }
}

/// A configuration document or any node inside one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum ConfigValue {
    Scalar(Scalar),
    Record(Record),
    Collection(Vec<ConfigValue>),
}

impl ConfigValue {
    pub fn null() -> Self {
        ConfigValue::Scalar(Scalar::Null)
    }

    /// Parse JSON text into a value, keeping key order
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Ok(Self::from(json))
    }

    pub fn shape(&self) -> Shape {
        match self {
            ConfigValue::Scalar(_) => Shape::Scalar,
            ConfigValue::Record(_) => Shape::Record,
            ConfigValue::Collection(_) => Shape::Collection,
        }
    }

    pub fn is_container(&self) -> bool {
        !matches!(self, ConfigValue::Scalar(_))
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            ConfigValue::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Collection(items) => Some(items),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConfigValue::Scalar(Scalar::Null) => serde_json::Value::Null,
            ConfigValue::Scalar(Scalar::Bool(b)) => serde_json::Value::Bool(*b),
            ConfigValue::Scalar(Scalar::Number(n)) => serde_json::Value::Number(n.clone()),
            ConfigValue::Scalar(Scalar::String(s)) => serde_json::Value::String(s.clone()),
            ConfigValue::Record(record) => serde_json::Value::Object(
                record
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
            ConfigValue::Collection(items) => {
                serde_json::Value::Array(items.iter().map(ConfigValue::to_json).collect())
            }
        }
    }

    /// Canonical serialization used for equality and display
    ///
    /// Compact JSON with record keys in insertion order and numbers in their
    /// parsed literal form, so `80` and `"80"` serialize differently.
    pub fn canonical_string(&self) -> String {
        self.to_json().to_string()
    }

    /// Indented form of the canonical serialization
    pub fn pretty_string(&self) -> String {
        serde_json::to_string_pretty(&self.to_json()).unwrap_or_else(|_| self.canonical_string())
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ConfigValue::Scalar(Scalar::Null),
            serde_json::Value::Bool(b) => ConfigValue::Scalar(Scalar::Bool(b)),
            serde_json::Value::Number(n) => ConfigValue::Scalar(Scalar::Number(n)),
            serde_json::Value::String(s) => ConfigValue::Scalar(Scalar::String(s)),
            serde_json::Value::Array(items) => {
                ConfigValue::Collection(items.into_iter().map(ConfigValue::from).collect())
            }
            serde_json::Value::Object(map) => ConfigValue::Record(
                map.into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<ConfigValue> for serde_json::Value {
    fn from(value: ConfigValue) -> Self {
        value.to_json()
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_keeps_insertion_order() {
        let value = ConfigValue::from(json!({ "zeta": 1, "alpha": 2, "mid": 3 }));
        let record = value.as_record().unwrap();
        let keys: Vec<_> = record.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(value.canonical_string(), r#"{"zeta":1,"alpha":2,"mid":3}"#);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut record = Record::new();
        record.insert("a", ConfigValue::null());
        record.insert("b", ConfigValue::null());
        record.insert("a", ConfigValue::from(json!(true)));
        let keys: Vec<_> = record.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(record.get("a"), Some(&ConfigValue::from(json!(true))));
    }

    #[test]
    fn test_number_and_string_serialize_differently() {
        let number = ConfigValue::from(json!(80));
        let string = ConfigValue::from(json!("80"));
        assert_ne!(number.canonical_string(), string.canonical_string());
    }

    #[test]
    fn test_shape() {
        assert_eq!(ConfigValue::from(json!([])).shape(), Shape::Collection);
        assert_eq!(ConfigValue::from(json!({})).shape(), Shape::Record);
        assert_eq!(ConfigValue::from(json!("x")).shape(), Shape::Scalar);
    }

    #[test]
    fn test_serde_roundtrip_through_json_value() {
        let value: ConfigValue = serde_json::from_str(r#"{"b":[1,{"c":null}],"a":"x"}"#).unwrap();
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"b":[1,{"c":null}],"a":"x"}"#);
    }
}
