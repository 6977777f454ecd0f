//! Pre-commit validation
//!
//! Runs before a configuration write is allowed:
//!
//! 1. Parse the draft text (failure stops everything)
//! 2. Check the top-level shape against the section contract
//! 3. Warn when a non-empty collection is about to be cleared
//! 4. Diff the draft against the original
//!
//! The verdict is plain data. The validator keeps no record of earlier checks;
//! callers that gate writes on it should use [`crate::gate::CheckedDraft`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::diff::{diff, ChangeEntry};
use crate::value::{ConfigValue, Shape};

/// Warning added when the draft is identical to the original
pub const NO_CHANGES: &str = "No changes detected";

/// Outcome of a pre-commit check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub ok: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub changes: Vec<ChangeEntry>,
}

impl CheckResult {
    fn rejected(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            ok: false,
            errors,
            warnings,
            changes: Vec::new(),
        }
    }

    /// Human-readable summary line
    pub fn summary(&self) -> String {
        if !self.ok {
            format!("Rejected: {} error(s)", self.errors.len())
        } else if self.changes.is_empty() {
            "Valid, no changes".to_string()
        } else {
            format!(
                "Valid: {} change(s), {} warning(s)",
                self.changes.len(),
                self.warnings.len()
            )
        }
    }
}

/// Expected top-level shape per configuration section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionContract {
    #[serde(flatten)]
    shapes: HashMap<String, Shape>,
}

impl SectionContract {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, section: impl Into<String>, shape: Shape) -> Self {
        self.shapes.insert(section.into(), shape);
        self
    }

    pub fn insert(&mut self, section: impl Into<String>, shape: Shape) {
        self.shapes.insert(section.into(), shape);
    }

    pub fn expected(&self, section: &str) -> Option<Shape> {
        self.shapes.get(section).copied()
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, Shape)> {
        self.shapes.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl FromIterator<(String, Shape)> for SectionContract {
    fn from_iter<I: IntoIterator<Item = (String, Shape)>>(iter: I) -> Self {
        Self {
            shapes: iter.into_iter().collect(),
        }
    }
}

/// Pre-commit validator bound to a section contract
#[derive(Debug, Clone, Default)]
pub struct Validator {
    contract: SectionContract,
}

impl Validator {
    pub fn new(contract: SectionContract) -> Self {
        Self { contract }
    }

    pub fn contract(&self) -> &SectionContract {
        &self.contract
    }

    /// Validate a draft for `section_name` against the optional original
    pub fn check(&self, section_name: &str, draft_text: &str, original: Option<&ConfigValue>) -> CheckResult {
        let parsed = match ConfigValue::from_json_str(draft_text) {
            Ok(v) => v,
            Err(e) => {
                debug!(section = section_name, error = %e, "draft failed to parse");
                return CheckResult::rejected(vec![format!("Invalid JSON: {}", e)], Vec::new());
            }
        };
        self.check_value(section_name, &parsed, original)
    }

    /// Validate an already-parsed draft
    pub fn check_value(&self, section_name: &str, draft: &ConfigValue, original: Option<&ConfigValue>) -> CheckResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if let Some(expected) = self.contract.expected(section_name) {
            let actual = draft.shape();
            if actual != expected {
                errors.push(format!(
                    "Section '{}' expects {} but the draft is {}",
                    section_name,
                    expected.describe(),
                    actual.describe()
                ));
            }
        }

        if let (ConfigValue::Collection(after), Some(ConfigValue::Collection(before))) = (draft, original) {
            if after.is_empty() && !before.is_empty() {
                warnings.push(format!(
                    "This will clear all {} existing entries in '{}'",
                    before.len(),
                    section_name
                ));
            }
        }

        if !errors.is_empty() {
            debug!(section = section_name, errors = errors.len(), "draft violates section contract");
            return CheckResult::rejected(errors, warnings);
        }

        let changes = original
            .map(|o| {
                let (before, after) = strip_shared_envelope(section_name, o, draft);
                diff(before, after)
            })
            .unwrap_or_default();
        if changes.is_empty() && warnings.is_empty() {
            warnings.push(NO_CHANGES.to_string());
        }

        debug!(
            section = section_name,
            changes = changes.len(),
            warnings = warnings.len(),
            "draft accepted"
        );
        CheckResult {
            ok: true,
            errors: Vec::new(),
            warnings,
            changes,
        }
    }
}

/// Free-function form of [`Validator::check`]
pub fn check(
    contract: &SectionContract,
    section_name: &str,
    draft_text: &str,
    original: Option<&ConfigValue>,
) -> CheckResult {
    Validator::new(contract.clone()).check(section_name, draft_text, original)
}

/// Strip a `{ "<section>": ... }` envelope carried by both sides of a diff
///
/// When only one side is wrapped, both are returned unchanged.
fn strip_shared_envelope<'a>(
    section_name: &str,
    original: &'a ConfigValue,
    draft: &'a ConfigValue,
) -> (&'a ConfigValue, &'a ConfigValue) {
    match (envelope_body(section_name, original), envelope_body(section_name, draft)) {
        (Some(before), Some(after)) => (before, after),
        _ => (original, draft),
    }
}

fn envelope_body<'a>(section_name: &str, value: &'a ConfigValue) -> Option<&'a ConfigValue> {
    match value {
        ConfigValue::Record(record) if record.len() == 1 => record.get(section_name),
        _ => None,
    }
}
