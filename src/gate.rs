//! Write gating for validated drafts
//!
//! A verdict only authorizes a write for the exact draft text it was computed
//! from. [`CheckedDraft`] binds the two together by checksum so an edit made
//! after the check makes the verdict stale.

use thiserror::Error;

use crate::checksum::Checksum;
use crate::validate::{CheckResult, Validator};
use crate::value::ConfigValue;

/// Reasons a write is refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("Draft for '{section}' failed validation: {}", .errors.join("; "))]
    Rejected { section: String, errors: Vec<String> },

    #[error("Draft for '{section}' changed since it was checked (checked {checked}, now {current})")]
    Stale {
        section: String,
        checked: String,
        current: String,
    },
}

/// A draft together with the verdict of its most recent check
#[derive(Debug, Clone)]
pub struct CheckedDraft {
    section: String,
    checksum: Checksum,
    parsed: Option<ConfigValue>,
    result: CheckResult,
}

impl CheckedDraft {
    /// Run the validator and remember which text the verdict belongs to
    pub fn check(
        validator: &Validator,
        section: &str,
        draft_text: &str,
        original: Option<&ConfigValue>,
    ) -> Self {
        let result = validator.check(section, draft_text, original);
        let parsed = if result.ok {
            ConfigValue::from_json_str(draft_text).ok()
        } else {
            None
        };
        Self {
            section: section.to_string(),
            checksum: Checksum::of_text(draft_text),
            parsed,
            result,
        }
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn result(&self) -> &CheckResult {
        &self.result
    }

    /// Whether `current_text` is still the text that was checked
    pub fn is_current(&self, current_text: &str) -> bool {
        self.checksum.verify(current_text)
    }

    /// Release the parsed draft for writing
    ///
    /// Fails if the check did not pass or the draft has been edited since.
    pub fn approve(&self, current_text: &str) -> Result<&ConfigValue, GateError> {
        if !self.is_current(current_text) {
            return Err(GateError::Stale {
                section: self.section.clone(),
                checked: self.checksum.short().to_string(),
                current: Checksum::of_text(current_text).short().to_string(),
            });
        }
        match (&self.parsed, self.result.ok) {
            (Some(parsed), true) => Ok(parsed),
            _ => Err(GateError::Rejected {
                section: self.section.clone(),
                errors: self.result.errors.clone(),
            }),
        }
    }
}
