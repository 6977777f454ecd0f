//! Checksum utilities for configuration documents and draft text

use sha2::{Digest, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::ConfigValue;

/// SHA256 checksum, lowercase hex
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute checksum of a text buffer, byte for byte
    pub fn of_text(content: &str) -> Self {
        Self::from_bytes(content.as_bytes())
    }

    /// Compute checksum of a document's canonical serialization
    pub fn of_value(value: &ConfigValue) -> Self {
        Self::of_text(&value.canonical_string())
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix for display
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }

    /// Verify that text matches this checksum
    pub fn verify(&self, content: &str) -> bool {
        *self == Self::of_text(content)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
