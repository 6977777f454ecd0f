//! fleetdiff: configuration diff & alignment engine
//!
//! Compares semi-structured device configuration documents and reports
//! structural, field-level differences for a network device fleet.
//!
//! ## Features
//!
//! - **N-Way Alignment**: Lines up one section from several devices or snapshots
//!   into diff-flagged rows, matching unordered collections by identity key
//! - **Pairwise Diff**: Typed added/removed/modified entries between two versions
//! - **Pre-Commit Validation**: Parse, shape contract, and diff gating a write
//! - **Key Paths**: Flatten documents to `a.b[0].c` paths and resolve them back
//! - **Drift Detection**: SHA256 checksums of canonical documents against a baseline
//!
//! ## Architecture
//!
//! ```text
//! format ──► identity ──► align ◄── normalize
//!                           │
//! value ──► diff ──► validate ──► gate
//!             │
//!             └──► drift ◄── checksum
//! ```
//!
//! Everything except [`loader`] and [`config`] is pure: no I/O, no shared state,
//! inputs are never mutated.

pub mod align;
pub mod checksum;
pub mod config;
pub mod diff;
pub mod drift;
pub mod error;
pub mod format;
pub mod gate;
pub mod identity;
pub mod loader;
pub mod normalize;
pub mod patch;
pub mod path;
pub mod validate;
pub mod value;

pub use align::{build_rows, AlignmentBuilder, Column, ComparisonRow, ComparisonTable};
pub use checksum::Checksum;
pub use config::{EngineConfig, OutputFormat};
pub use diff::{diff, diff_at, render_text_diff, ChangeEntry, ChangeKind};
pub use drift::{detect_drift, DriftReport};
pub use error::{EngineError, Result};
pub use format::{cell_str, humanize, MISSING};
pub use gate::{CheckedDraft, GateError};
pub use identity::{find_identity_key, IdentityResolver};
pub use normalize::normalize;
pub use patch::apply_patch;
pub use path::{flatten, resolve_path};
pub use validate::{check, CheckResult, SectionContract, Validator};
pub use value::{ConfigValue, Record, Scalar, Shape};
