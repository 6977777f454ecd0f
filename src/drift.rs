//! Baseline drift detection
//!
//! A device drifts when its latest snapshot no longer matches the baseline
//! snapshot. Checksums decide whether it drifted; the structural diff says how.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::checksum::Checksum;
use crate::diff::{diff, ChangeEntry};
use crate::value::ConfigValue;

/// Result of comparing a snapshot against its baseline
#[derive(Debug, Clone, Serialize)]
pub struct DriftReport {
    pub section: String,
    pub drifted: bool,
    pub baseline_checksum: Checksum,
    pub latest_checksum: Checksum,
    pub changes: Vec<ChangeEntry>,
    pub checked_at: DateTime<Utc>,
}

/// Compare the latest snapshot of a section with its baseline
pub fn detect_drift(section: &str, baseline: &ConfigValue, latest: &ConfigValue) -> DriftReport {
    let baseline_checksum = Checksum::of_value(baseline);
    let latest_checksum = Checksum::of_value(latest);
    let drifted = baseline_checksum != latest_checksum;

    let changes = if drifted { diff(baseline, latest) } else { Vec::new() };
    if drifted {
        info!(
            section,
            baseline = baseline_checksum.short(),
            latest = latest_checksum.short(),
            changes = changes.len(),
            "drift detected"
        );
    }

    DriftReport {
        section: section.to_string(),
        drifted,
        baseline_checksum,
        latest_checksum,
        changes,
        checked_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identical_snapshots() {
        let doc = ConfigValue::from(json!({ "hostname": "fw-1" }));
        let report = detect_drift("system", &doc, &doc.clone());
        assert!(!report.drifted);
        assert!(report.changes.is_empty());
        assert_eq!(report.baseline_checksum, report.latest_checksum);
    }

    #[test]
    fn test_drift_reports_changes() {
        let baseline = ConfigValue::from(json!({ "hostname": "fw-1", "auto_update_check": false }));
        let latest = ConfigValue::from(json!({ "hostname": "fw-1", "auto_update_check": true }));
        let report = detect_drift("system", &baseline, &latest);
        assert!(report.drifted);
        assert_eq!(report.changes.len(), 1);
        assert_eq!(report.changes[0].path, "auto_update_check");
    }

    #[test]
    fn test_reordered_collection_drifts_without_entries() {
        let baseline = ConfigValue::from(json!({ "servers": ["a", "b"] }));
        let latest = ConfigValue::from(json!({ "servers": ["b", "a"] }));
        let report = detect_drift("ntp", &baseline, &latest);
        assert!(report.drifted);
        assert!(report.changes.is_empty());
    }
}
