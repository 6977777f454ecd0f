//! Pairwise structural diff
//!
//! Compares an original document with a draft and reports typed change
//! entries, walking records depth-first in pre-order.
//!
//! Collections are compared by length only: two collections of the same length
//! produce no entries even when their elements differ. Element-level matching
//! lives in [`crate::align`].

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

use crate::value::ConfigValue;

/// Path used for changes at the top of a non-record document
pub const ROOT_PATH: &str = "(root)";

/// Kind of change between two documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

/// A single detected change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub kind: ChangeKind,
    /// Dot-joined key path, or [`ROOT_PATH`]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl ChangeEntry {
    pub fn added(path: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Added,
            path: path.into(),
            from: None,
            to: Some(to.into()),
        }
    }

    pub fn removed(path: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Removed,
            path: path.into(),
            from: Some(from.into()),
            to: None,
        }
    }

    pub fn modified(path: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Modified,
            path: path.into(),
            from: Some(from.into()),
            to: Some(to.into()),
        }
    }

    /// Human-readable description
    pub fn describe(&self) -> String {
        let from = self.from.as_deref().unwrap_or("");
        let to = self.to.as_deref().unwrap_or("");
        match self.kind {
            ChangeKind::Added => format!("+ {}: {}", self.path, to),
            ChangeKind::Removed => format!("- {}: {}", self.path, from),
            ChangeKind::Modified => format!("~ {}: {} → {}", self.path, from, to),
        }
    }
}

/// Diff two documents from the top
pub fn diff(original: &ConfigValue, draft: &ConfigValue) -> Vec<ChangeEntry> {
    diff_at(original, draft, "")
}

/// Diff two documents rooted at `path`
pub fn diff_at(original: &ConfigValue, draft: &ConfigValue, path: &str) -> Vec<ChangeEntry> {
    let mut changes = Vec::new();
    walk(original, draft, path, &mut changes);
    changes
}

fn walk(original: &ConfigValue, draft: &ConfigValue, path: &str, changes: &mut Vec<ChangeEntry>) {
    match (original, draft) {
        (ConfigValue::Collection(before), ConfigValue::Collection(after)) => {
            if before.len() != after.len() {
                changes.push(ChangeEntry::modified(
                    display_path(path),
                    format!("{} items", before.len()),
                    format!("{} items", after.len()),
                ));
            }
        }
        (ConfigValue::Record(before), ConfigValue::Record(after)) => {
            for (key, old) in before.iter() {
                let key_path = join_path(path, key);
                let Some(new) = after.get(key) else {
                    changes.push(ChangeEntry::removed(key_path, old.canonical_string()));
                    continue;
                };

                let (old_str, new_str) = (old.canonical_string(), new.canonical_string());
                if old_str == new_str {
                    continue;
                }
                if old.is_container() && new.is_container() {
                    walk(old, new, &key_path, changes);
                } else {
                    changes.push(ChangeEntry::modified(key_path, old_str, new_str));
                }
            }
            for (key, new) in after.iter().filter(|(k, _)| !before.contains_key(k)) {
                changes.push(ChangeEntry::added(join_path(path, key), new.canonical_string()));
            }
        }
        _ => {
            let (old_str, new_str) = (original.canonical_string(), draft.canonical_string());
            if old_str != new_str {
                changes.push(ChangeEntry::modified(display_path(path), old_str, new_str));
            }
        }
    }
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        ROOT_PATH.to_string()
    } else {
        path.to_string()
    }
}

/// Unified line diff of the pretty-printed documents, for terminal output
pub fn render_text_diff(original: &ConfigValue, draft: &ConfigValue) -> String {
    let old_text = original.pretty_string();
    let new_text = draft.pretty_string();
    let diff = TextDiff::from_lines(&old_text, &new_text);

    let mut out = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        out.push_str(sign);
        out.push_str(change.value());
        if change.missing_newline() {
            out.push('\n');
        }
    }
    out
}
