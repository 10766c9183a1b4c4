use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// CVSS scoring information from a single source (e.g. "nvd", "ghsa").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cvss {
    #[serde(rename = "V3Score", default)]
    pub v3_score: f64,
    #[serde(rename = "V3Vector", default)]
    pub v3_vector: String,
}

/// A single vulnerability report tied to one package in one manifest.
///
/// Immutable once produced by the scanner; the resolver only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub vulnerability_id: String,
    pub pkg_name: String,
    pub installed_version: String,
    /// Empty when no fixed release is known.
    pub fixed_version: String,
    pub severity: String,
    pub title: String,
    pub description: String,
    pub primary_url: String,
    /// Raw CVSS entries keyed by source.
    pub cvss: HashMap<String, Cvss>,
    /// Highest V3 score across all sources; 0.0 when none are present.
    pub cvss_score: f64,
    /// True when the package is a transitive dependency of the manifest,
    /// per the scanner's package relationship table.
    pub indirect: bool,
}

impl Finding {
    pub fn has_fixed_version(&self) -> bool {
        !self.fixed_version.is_empty()
    }

    /// Package URL identifying this package at its installed version.
    pub fn purl(&self) -> String {
        format!("pkg:golang/{}@{}", self.pkg_name, self.installed_version)
    }
}

/// Highest CVSS v3 score across all scoring sources.
pub fn highest_cvss_score(cvss: &HashMap<String, Cvss>) -> f64 {
    cvss.values().fold(0.0, |acc, c| acc.max(c.v3_score))
}

/// The findings reported for a single manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanResult {
    pub target: String,
    pub findings: Vec<Finding>,
}

impl ScanResult {
    /// True when the same vulnerability (ID + package) is still reported.
    pub fn contains(&self, vulnerability_id: &str, pkg_name: &str) -> bool {
        self.findings
            .iter()
            .any(|f| f.vulnerability_id == vulnerability_id && f.pkg_name == pkg_name)
    }
}
