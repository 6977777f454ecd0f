//! N-way alignment and diff rows
//!
//! Takes one configuration section from 2..k devices or snapshots and lines the
//! documents up into rows, one value per column, flagging rows whose values
//! disagree.
//!
//! ## Alignment modes
//!
//! - **Collection with identity key**: rows are matched across columns by the
//!   string form of their identity field (see [`crate::identity`]). A row missing
//!   from some column gets an extra `(exists)` row.
//! - **Collection without identity key**: rows are matched by position.
//! - **Record**: one row per scalar field.
//! - **Scalar**: a single row for the whole section.
//!
//! Row order is always first-seen order across columns, never sorted.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::format::{cell_str, humanize};
use crate::identity::IdentityResolver;
use crate::normalize::normalize;
use crate::value::{ConfigValue, Record};

/// Cell value of an `(exists)` row for columns that contain the record
pub const PRESENT: &str = "✓";

/// Separates the identity value from the field in row labels
pub const LABEL_SEPARATOR: &str = " · ";

/// One participant in a comparison
///
/// `value` is `None` when the document could not be fetched or was never loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub id: String,
    pub value: Option<ConfigValue>,
}

impl Column {
    pub fn present(id: impl Into<String>, value: ConfigValue) -> Self {
        Self {
            id: id.into(),
            value: Some(value),
        }
    }

    pub fn absent(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: None,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }
}

/// One aligned line of a comparison table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    pub label: String,
    /// One entry per column; `None` where the column has nothing to show
    pub values: Vec<Option<String>>,
    pub differs: bool,
}

/// One column's contribution to a row
///
/// `None` is an absent column, `Some(None)` a column whose record lacks the field.
type Cell<'a> = Option<Option<&'a ConfigValue>>;

/// What a cell is compared by when deciding `differs`
#[derive(PartialEq, Eq, Hash)]
enum CellKey {
    Absent,
    Missing,
    Value(String),
}

impl CellKey {
    fn of(cell: Cell<'_>) -> Self {
        match cell {
            None => CellKey::Absent,
            Some(None) => CellKey::Missing,
            Some(Some(value)) => CellKey::Value(value.canonical_string()),
        }
    }
}

impl ComparisonRow {
    /// Build a row from per-column cells
    ///
    /// Displayed values go through [`cell_str`], but `differs` compares the
    /// canonical form of each cell: `80` and `"80"` display alike and still differ.
    fn from_cells(label: impl Into<String>, cells: &[Cell<'_>]) -> Self {
        let distinct: HashSet<CellKey> = cells.iter().map(|c| CellKey::of(*c)).collect();
        Self {
            label: label.into(),
            values: cells.iter().map(|c| c.map(cell_str)).collect(),
            differs: distinct.len() > 1,
        }
    }
}

/// Rows for a whole section together with the column order they refer to
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonTable {
    pub section: String,
    pub columns: Vec<String>,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    pub fn differing_rows(&self) -> impl Iterator<Item = &ComparisonRow> {
        self.rows.iter().filter(|r| r.differs)
    }

    pub fn has_differences(&self) -> bool {
        self.rows.iter().any(|r| r.differs)
    }
}

/// Builds comparison rows with a given identity resolver
#[derive(Debug, Clone, Default)]
pub struct AlignmentBuilder {
    resolver: IdentityResolver,
}

impl AlignmentBuilder {
    pub fn new(resolver: IdentityResolver) -> Self {
        Self { resolver }
    }

    /// Align the column values of one section
    ///
    /// `values` holds one entry per column in display order. The first present
    /// value decides the alignment mode.
    pub fn build(&self, section_name: &str, values: &[Option<&ConfigValue>]) -> Vec<ComparisonRow> {
        let Some(reference) = values.iter().flatten().next() else {
            debug!(section = section_name, "no column present, nothing to align");
            return Vec::new();
        };

        match reference {
            ConfigValue::Collection(items) => match self.resolver.find(items) {
                Some(key) => {
                    debug!(section = section_name, key = %key, "aligning collection by identity key");
                    identity_rows(&key, values)
                }
                None => {
                    debug!(section = section_name, "no identity key, aligning by position");
                    positional_rows(values)
                }
            },
            ConfigValue::Record(_) => record_rows(values),
            ConfigValue::Scalar(_) => {
                let cells: Vec<Cell> = values.iter().map(|v| v.map(Some)).collect();
                vec![ComparisonRow::from_cells(humanize(section_name), &cells)]
            }
        }
    }

    /// Normalize vendor-wrapped columns, then align them
    pub fn compare_section(&self, section_name: &str, columns: &[Column]) -> ComparisonTable {
        let normalized: Vec<Option<ConfigValue>> = columns
            .iter()
            .map(|c| {
                c.value
                    .as_ref()
                    .map(|v| normalize(v).map(ConfigValue::Collection).unwrap_or_else(|| v.clone()))
            })
            .collect();
        let values: Vec<Option<&ConfigValue>> = normalized.iter().map(Option::as_ref).collect();

        ComparisonTable {
            section: section_name.to_string(),
            columns: columns.iter().map(|c| c.id.clone()).collect(),
            rows: self.build(section_name, &values),
        }
    }
}

/// Align columns looked up by id
///
/// Ids missing from `columns`, or mapped to `None`, are absent columns.
pub fn build_rows(
    section_name: &str,
    column_ids: &[String],
    columns: &HashMap<String, Option<ConfigValue>>,
) -> Vec<ComparisonRow> {
    let values: Vec<Option<&ConfigValue>> = column_ids
        .iter()
        .map(|id| columns.get(id).and_then(Option::as_ref))
        .collect();
    AlignmentBuilder::default().build(section_name, &values)
}

/// Scalar field names across records in first-seen order
fn scalar_fields<'a>(records: impl Iterator<Item = &'a Record>, exclude: Option<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut fields = Vec::new();
    for record in records {
        for (key, value) in record.iter() {
            if value.is_container() || Some(key) == exclude {
                continue;
            }
            if seen.insert(key) {
                fields.push(key.to_string());
            }
        }
    }
    fields
}

fn identity_rows(key: &str, values: &[Option<&ConfigValue>]) -> Vec<ComparisonRow> {
    let identity_of = |record: &Record| cell_str(record.get(key));

    // one pass per column: first record per identity, identities in first-seen order
    let mut seen = HashSet::new();
    let mut identities = Vec::new();
    let mut indexes: Vec<Option<HashMap<String, &Record>>> = Vec::with_capacity(values.len());
    for value in values {
        let index = value.and_then(ConfigValue::as_collection).map(|items| {
            let mut index = HashMap::with_capacity(items.len());
            for record in items.iter().filter_map(ConfigValue::as_record) {
                let id = identity_of(record);
                if seen.insert(id.clone()) {
                    identities.push(id.clone());
                }
                index.entry(id).or_insert(record);
            }
            index
        });
        indexes.push(index);
    }

    let mut rows = Vec::new();
    for id in &identities {
        let matched: Vec<Option<&Record>> = indexes
            .iter()
            .map(|index| index.as_ref().and_then(|index| index.get(id).copied()))
            .collect();

        if matched.iter().any(Option::is_none) {
            rows.push(ComparisonRow {
                label: format!("{}{}(exists)", id, LABEL_SEPARATOR),
                values: matched
                    .iter()
                    .map(|m| m.map(|_| PRESENT.to_string()))
                    .collect(),
                differs: true,
            });
        }

        for field in scalar_fields(matched.iter().flatten().copied(), Some(key)) {
            let cells: Vec<Cell> = matched.iter().map(|m| m.map(|r| r.get(&field))).collect();
            rows.push(ComparisonRow::from_cells(
                format!("{}{}{}", id, LABEL_SEPARATOR, humanize(&field)),
                &cells,
            ));
        }
    }
    rows
}

fn positional_rows(values: &[Option<&ConfigValue>]) -> Vec<ComparisonRow> {
    let collections: Vec<Option<&[ConfigValue]>> = values
        .iter()
        .map(|v| v.and_then(ConfigValue::as_collection))
        .collect();
    let longest = collections
        .iter()
        .flatten()
        .map(|items| items.len())
        .max()
        .unwrap_or(0);

    (0..longest)
        .map(|index| {
            let cells: Vec<Cell> = collections
                .iter()
                .map(|items| items.and_then(|items| items.get(index)).map(Some))
                .collect();
            ComparisonRow::from_cells(format!("[{}]", index), &cells)
        })
        .collect()
}

fn record_rows(values: &[Option<&ConfigValue>]) -> Vec<ComparisonRow> {
    let records: Vec<Option<&Record>> = values
        .iter()
        .map(|v| v.and_then(ConfigValue::as_record))
        .collect();

    scalar_fields(records.iter().flatten().copied(), None)
        .into_iter()
        .map(|field| {
            let cells: Vec<Cell> = records.iter().map(|r| r.map(|r| r.get(&field))).collect();
            ComparisonRow::from_cells(humanize(&field), &cells)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::MISSING;
    use serde_json::json;

    fn value(v: serde_json::Value) -> ConfigValue {
        ConfigValue::from(v)
    }

    fn build(section: &str, docs: &[Option<ConfigValue>]) -> Vec<ComparisonRow> {
        let values: Vec<Option<&ConfigValue>> = docs.iter().map(Option::as_ref).collect();
        AlignmentBuilder::default().build(section, &values)
    }

    #[test]
    fn test_no_present_column() {
        assert!(build("dns", &[None, None]).is_empty());
    }

    #[test]
    fn test_identity_alignment_ignores_order() {
        let a = value(json!([
            { "name": "HTTP", "protocol": "tcp", "port": 80 },
            { "name": "HTTPS", "protocol": "tcp", "port": 443 }
        ]));
        let b = value(json!([
            { "name": "HTTPS", "protocol": "tcp", "port": 443 },
            { "name": "HTTP", "protocol": "tcp", "port": 8080 }
        ]));
        let rows = build("service_objects", &[Some(a), Some(b)]);

        let labels: Vec<_> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["HTTP · Protocol", "HTTP · Port", "HTTPS · Protocol", "HTTPS · Port"]
        );
        let port = &rows[1];
        assert!(port.differs);
        assert_eq!(port.values, vec![Some("80".to_string()), Some("8080".to_string())]);
        assert!(!rows[3].differs);
    }

    #[test]
    fn test_missing_field_uses_sentinel() {
        let a = value(json!([{ "name": "wan1", "ip": "203.0.113.1", "mask": "255.255.255.0" }]));
        let b = value(json!([{ "name": "wan1", "ip": "203.0.113.1" }]));
        let rows = build("interfaces", &[Some(a), Some(b)]);
        let mask = rows.iter().find(|r| r.label == "wan1 · Mask").unwrap();
        assert_eq!(mask.values[1], Some(MISSING.to_string()));
        assert!(mask.differs);
    }

    #[test]
    fn test_container_fields_are_skipped() {
        let a = value(json!([{ "name": "r1", "members": ["a", "b"], "action": "allow" }]));
        let rows = build("rules", &[Some(a.clone()), Some(a)]);
        let labels: Vec<_> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["r1 · Action"]);
    }

    #[test]
    fn test_positional_alignment_ragged() {
        let a = value(json!(["8.8.8.8", "8.8.4.4"]));
        let b = value(json!(["8.8.8.8"]));
        let rows = build("servers", &[Some(a), Some(b), None]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "[0]");
        assert_eq!(rows[0].values, vec![Some("8.8.8.8".to_string()), Some("8.8.8.8".to_string()), None]);
        assert_eq!(rows[1].values, vec![Some("8.8.4.4".to_string()), None, None]);
        assert!(rows[1].differs);
    }

    #[test]
    fn test_positional_records_serialized_whole() {
        let a = value(json!([{ "default_snat": "yes" }]));
        let rows = build("nat_snat", &[Some(a.clone()), Some(a)]);
        assert_eq!(rows[0].values[0], Some(r#"{"default_snat":"yes"}"#.to_string()));
        assert!(!rows[0].differs);
    }

    #[test]
    fn test_record_alignment_unions_keys() {
        let a = value(json!({ "timezone": "UTC", "enabled": true, "servers": ["pool.ntp.org"] }));
        let b = value(json!({ "enabled": false, "drift_file": "/var/ntp" }));
        let rows = build("ntp", &[Some(a), Some(b)]);
        let labels: Vec<_> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Timezone", "Enabled", "Drift File"]);
        assert_eq!(rows[0].values, vec![Some("UTC".to_string()), Some(MISSING.to_string())]);
        assert!(rows[1].differs);
    }

    #[test]
    fn test_scalar_section() {
        let rows = build("login_timeout", &[Some(value(json!(0))), None, Some(value(json!(0)))]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "Login Timeout");
        assert!(rows[0].differs);
    }

    #[test]
    fn test_numeric_surface_forms_differ() {
        let rows = build("port", &[Some(value(json!(80))), Some(value(json!("80")))]);
        assert_eq!(rows[0].values, vec![Some("80".to_string()), Some("80".to_string())]);
        assert!(rows[0].differs);

        let rows = build("svc", &[Some(value(json!({ "port": 80 }))), Some(value(json!({ "port": "80" })))]);
        assert_eq!(rows[0].label, "Port");
        assert!(rows[0].differs);

        let rows = build(
            "service_objects",
            &[
                Some(value(json!([{ "name": "http", "port": 80 }]))),
                Some(value(json!([{ "name": "http", "port": "80" }]))),
            ],
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "http · Port");
        assert!(rows[0].differs);
    }

    #[test]
    fn test_null_field_differs_from_missing_field() {
        let rows = build("ntp", &[Some(value(json!({ "server": null }))), Some(value(json!({})))]);
        assert_eq!(rows[0].values, vec![Some(MISSING.to_string()), Some(MISSING.to_string())]);
        assert!(rows[0].differs);
    }

    #[test]
    fn test_duplicate_identity_uses_first_record() {
        let a = value(json!([{ "name": "r1", "action": "allow" }, { "name": "r1", "action": "deny" }]));
        let b = value(json!([{ "name": "r1", "action": "allow" }]));
        let rows = build("rules", &[Some(a), Some(b)]);
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].differs);
    }

    #[test]
    fn test_identity_alignment_scales() {
        let rules = |offset: usize| {
            let items: Vec<_> = (0..3000)
                .map(|i| json!({ "name": format!("rule-{}", i + offset), "action": "allow" }))
                .collect();
            Some(value(serde_json::Value::Array(items)))
        };
        let start = std::time::Instant::now();
        let rows = build("firewall_rules", &[rules(0), rules(0), rules(1500)]);
        assert!(start.elapsed() < std::time::Duration::from_secs(2));
        // 4500 identities, 3000 of them missing from some column
        assert_eq!(rows.len(), 4500 + 3000);
    }

    #[test]
    fn test_build_rows_by_id() {
        let mut columns = HashMap::new();
        columns.insert("fw-1".to_string(), Some(value(json!({ "hostname": "a" }))));
        columns.insert("fw-2".to_string(), None);
        let ids = vec!["fw-1".to_string(), "fw-2".to_string(), "fw-3".to_string()];
        let rows = build_rows("system", &ids, &columns);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].values, vec![Some("a".to_string()), None, None]);
    }

    #[test]
    fn test_compare_section_unwraps_wrappers() {
        let wrapped = value(json!([{ "_secure_policy_rule": [{ "_name": "r1", "_action": "allow" }] }]));
        let plain = value(json!([{ "_name": "r1", "_action": "deny" }]));
        let table = AlignmentBuilder::default().compare_section(
            "firewall_rules",
            &[Column::present("a", wrapped), Column::present("b", plain)],
        );
        assert_eq!(table.columns, vec!["a", "b"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].label, "r1 · Action");
        assert!(table.has_differences());
    }
}
