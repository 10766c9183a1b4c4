//! Severity filtering over a finding set.

use std::collections::HashMap;

use crate::models::{Finding, ScanResult};

/// Keep only findings at or above the CVSS threshold, preserving order.
pub fn filter_by_cvss(result: &ScanResult, threshold: f64) -> ScanResult {
    ScanResult {
        target: result.target.clone(),
        findings: result
            .findings
            .iter()
            .filter(|f| f.cvss_score >= threshold)
            .cloned()
            .collect(),
    }
}

/// Split findings into (direct, indirect) by the scanner's directness flag.
pub fn split_by_directness(findings: &[Finding]) -> (Vec<&Finding>, Vec<&Finding>) {
    findings.iter().partition(|f| !f.indirect)
}

/// Group findings by affected package name.
pub fn group_by_package(findings: &[Finding]) -> HashMap<&str, Vec<&Finding>> {
    let mut grouped: HashMap<&str, Vec<&Finding>> = HashMap::new();
    for f in findings {
        grouped.entry(f.pkg_name.as_str()).or_default().push(f);
    }
    grouped
}
