//! Document loading
//!
//! Reads JSON documents from disk into comparison columns. A file that cannot
//! be read or parsed becomes an absent column rather than an error, so one bad
//! snapshot never hides the others.

use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

use crate::align::Column;
use crate::error::Result;
use crate::value::{ConfigValue, Scalar};

/// Read and parse one JSON document
pub fn load_document(path: &Path) -> Result<ConfigValue> {
    let content = fs::read_to_string(path)?;
    Ok(ConfigValue::from_json_str(&content)?)
}

/// Column id for a file: its name without the `.json` extension
pub fn column_id(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().trim_end_matches(".json").to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Pick one section out of a full-configuration snapshot
///
/// Full snapshots are records keyed by section name. A snapshot without the
/// section, or with `null` for it, yields `None`.
pub fn extract_section(snapshot: &ConfigValue, section: &str) -> Option<ConfigValue> {
    match snapshot.as_record()?.get(section)? {
        ConfigValue::Scalar(Scalar::Null) => None,
        value => Some(value.clone()),
    }
}

/// Load a column, turning any failure into an absent column
pub fn load_column(path: &Path, section: Option<&str>) -> Column {
    let id = column_id(path);
    match load_document(path) {
        Ok(doc) => match section {
            Some(section) => match extract_section(&doc, section) {
                Some(value) => Column::present(id, value),
                None => {
                    warn!(column = %id, section, "section missing from snapshot");
                    Column::absent(id)
                }
            },
            None => Column::present(id, doc),
        },
        Err(e) => {
            warn!(column = %id, error = %e, "failed to load document, column is absent");
            Column::absent(id)
        }
    }
}

/// Load one column per path, in the order given
pub fn load_columns<P: AsRef<Path>>(paths: &[P], section: Option<&str>) -> Vec<Column> {
    paths.iter().map(|p| load_column(p.as_ref(), section)).collect()
}

/// Load every `.json` file in a directory as a column, ordered by file name
pub fn load_snapshot_dir(dir: &Path, section: Option<&str>) -> anyhow::Result<Vec<Column>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to read directory {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() && path.extension().map(|e| e == "json").unwrap_or(false) {
            paths.push(path.to_path_buf());
        }
    }
    if paths.is_empty() {
        anyhow::bail!("No .json snapshots found in {}", dir.display());
    }
    Ok(load_columns(&paths, section))
}
