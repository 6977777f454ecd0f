//! Identity key resolution for unordered collections
//!
//! Device dumps usually carry either a human name or an ordinal on each row.
//! Finding that field lets the alignment builder match rows by meaning instead
//! of by position.

use crate::value::ConfigValue;

/// Candidate identity keys, most specific first
pub const DEFAULT_CANDIDATES: &[&str] = &[
    "_name", "_Name", "name", "Name", "_no", "no", "_No", "_seq", "seq", "_priority", "priority",
    "_id", "id", "_index", "index",
];

/// Resolves identity keys against an ordered candidate list
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    candidates: Vec<String>,
}

impl IdentityResolver {
    pub fn new(candidates: Vec<String>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// First candidate present in the first row
    ///
    /// Only the first row is inspected; `None` when the rows are empty or the
    /// first row is not a record.
    pub fn find(&self, rows: &[ConfigValue]) -> Option<String> {
        let first = rows.first()?.as_record()?;
        self.candidates
            .iter()
            .find(|c| first.contains_key(c))
            .cloned()
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new(DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect())
    }
}

/// [`IdentityResolver::find`] with the default candidate list
pub fn find_identity_key(rows: &[ConfigValue]) -> Option<String> {
    IdentityResolver::default().find(rows)
}
