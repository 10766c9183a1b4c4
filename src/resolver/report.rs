//! Accumulates findings the resolver could not fix, for VEX emission.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::models::{Finding, Outcome, Resolution};

/// One finding that survived a full remediation pass.
#[derive(Debug, Clone, Serialize)]
pub struct UnresolvedFinding {
    pub finding: Finding,
    /// Directory of the manifest the finding belongs to.
    pub module_dir: PathBuf,
    /// Reason code mirroring the terminal outcome.
    pub reason_code: &'static str,
    pub reason: String,
}

/// The unresolved set for one run. Built while findings are processed,
/// handed once to the VEX generator, discarded after.
#[derive(Debug, Default)]
pub struct UnresolvedReport {
    entries: Vec<UnresolvedFinding>,
}

impl UnresolvedReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolution; fixed outcomes are ignored.
    pub fn record(&mut self, finding: &Finding, resolution: &Resolution, module_dir: &Path) {
        if resolution.outcome.is_fixed() {
            return;
        }
        self.entries.push(UnresolvedFinding {
            finding: finding.clone(),
            module_dir: module_dir.to_path_buf(),
            reason_code: resolution.outcome.reason_code(),
            reason: resolution.reason.clone(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[UnresolvedFinding] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn finding(id: &str) -> Finding {
        Finding {
            vulnerability_id: id.into(),
            pkg_name: "lib/x".into(),
            installed_version: "v1.0.0".into(),
            fixed_version: String::new(),
            severity: "HIGH".into(),
            title: String::new(),
            description: String::new(),
            primary_url: String::new(),
            cvss: HashMap::new(),
            cvss_score: 8.0,
            indirect: true,
        }
    }

    #[test]
    fn test_fixed_outcomes_not_recorded() {
        let mut report = UnresolvedReport::new();
        report.record(
            &finding("CVE-1"),
            &Resolution::new(Outcome::FixedDirect, "updated"),
            Path::new("/work"),
        );
        report.record(
            &finding("CVE-2"),
            &Resolution::new(Outcome::FixedViaNamespaceFallback, "sibling update"),
            Path::new("/work"),
        );
        assert!(report.is_empty());
    }

    #[test]
    fn test_unresolved_outcomes_keep_reason_codes() {
        let mut report = UnresolvedReport::new();
        report.record(
            &finding("CVE-3"),
            &Resolution::new(Outcome::SkippedNoFix, "no fixed version"),
            Path::new("/work"),
        );
        report.record(
            &finding("CVE-4"),
            &Resolution::new(Outcome::Failed, "candidates exhausted"),
            Path::new("/work"),
        );
        assert_eq!(report.len(), 2);
        assert_eq!(report.entries()[0].reason_code, "skipped-no-fix");
        assert_eq!(report.entries()[1].reason_code, "failed");
    }
}
