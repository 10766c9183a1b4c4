//! Trivy invocation and report parsing.

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::errors::AutobumpError;
use crate::models::{highest_cvss_score, Cvss, Finding, ScanResult};

/// Black-box producer of vulnerability findings for one manifest.
///
/// A scan that finds nothing is success with an empty set; a scan that
/// cannot execute at all is an error.
#[async_trait]
pub trait VulnScanner: Send + Sync {
    async fn scan(&self, gomod_path: &Path) -> Result<ScanResult, AutobumpError>;
}

/// Runs `trivy fs` against a single go.mod file.
#[derive(Debug, Clone, Default)]
pub struct TrivyScanner {
    /// Skip the vulnerability DB refresh on every invocation.
    pub skip_db_update: bool,
}

#[async_trait]
impl VulnScanner for TrivyScanner {
    async fn scan(&self, gomod_path: &Path) -> Result<ScanResult, AutobumpError> {
        let mut args = vec![
            "fs",
            "--format",
            "json",
            "--scanners",
            "vuln",
            "--pkg-types",
            "library",
        ];
        if self.skip_db_update {
            args.push("--skip-db-update");
        }
        debug!(target = %gomod_path.display(), "trivy fs");

        // Scan the go.mod file itself, not its directory, so nested modules
        // are not picked up.
        let output = Command::new("trivy")
            .args(&args)
            .arg(gomod_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| AutobumpError::Scan(format!("failed to spawn trivy: {e}")))?;

        // Trivy exits non-zero when vulnerabilities are found; only treat a
        // run with no output at all as a hard failure.
        if !output.status.success() && output.stdout.is_empty() {
            return Err(AutobumpError::Scan(format!(
                "trivy scan of {} failed: {}",
                gomod_path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let report: TrivyReport = serde_json::from_slice(&output.stdout)
            .map_err(|e| AutobumpError::Scan(format!("failed to parse trivy output: {e}")))?;
        Ok(convert_report(report, gomod_path))
    }
}

#[derive(Debug, Deserialize)]
struct TrivyReport {
    #[serde(rename = "Results", default)]
    results: Vec<TrivyResult>,
}

#[derive(Debug, Deserialize)]
struct TrivyResult {
    #[serde(rename = "Type", default)]
    result_type: String,
    #[serde(rename = "Packages", default)]
    packages: Vec<TrivyPackage>,
    #[serde(rename = "Vulnerabilities", default)]
    vulnerabilities: Vec<TrivyVulnerability>,
}

#[derive(Debug, Deserialize)]
struct TrivyPackage {
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Relationship", default)]
    relationship: String,
    #[serde(rename = "Indirect", default)]
    indirect: bool,
}

#[derive(Debug, Deserialize)]
struct TrivyVulnerability {
    #[serde(rename = "VulnerabilityID", default)]
    vulnerability_id: String,
    #[serde(rename = "PkgName", default)]
    pkg_name: String,
    #[serde(rename = "InstalledVersion", default)]
    installed_version: String,
    #[serde(rename = "FixedVersion", default)]
    fixed_version: String,
    #[serde(rename = "Severity", default)]
    severity: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Description", default)]
    description: String,
    #[serde(rename = "PrimaryURL", default)]
    primary_url: String,
    #[serde(rename = "CVSS", default)]
    cvss: HashMap<String, Cvss>,
}

fn convert_report(report: TrivyReport, gomod_path: &Path) -> ScanResult {
    let mut result = ScanResult {
        target: gomod_path.display().to_string(),
        findings: Vec::new(),
    };

    for trivy_result in report.results {
        if trivy_result.result_type != "gomod" {
            continue;
        }

        // Directness comes from the package relationship table.
        let mut package_indirect: HashMap<String, bool> = HashMap::new();
        for pkg in &trivy_result.packages {
            let indirect = pkg.indirect || pkg.relationship.eq_ignore_ascii_case("indirect");
            package_indirect.insert(pkg.name.clone(), indirect);
        }

        for vuln in trivy_result.vulnerabilities {
            let cvss_score = highest_cvss_score(&vuln.cvss);
            let indirect = package_indirect.get(&vuln.pkg_name).copied().unwrap_or(false);
            result.findings.push(Finding {
                vulnerability_id: vuln.vulnerability_id,
                pkg_name: vuln.pkg_name,
                installed_version: vuln.installed_version,
                fixed_version: vuln.fixed_version,
                severity: vuln.severity,
                title: vuln.title,
                description: vuln.description,
                primary_url: vuln.primary_url,
                cvss: vuln.cvss,
                cvss_score,
                indirect,
            });
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_report_scores_and_directness() {
        let raw = r#"{
          "Results": [
            {
              "Type": "gomod",
              "Packages": [
                {"Name": "github.com/a/direct", "Relationship": "direct"},
                {"Name": "github.com/b/indirect", "Relationship": "indirect", "Indirect": true}
              ],
              "Vulnerabilities": [
                {
                  "VulnerabilityID": "CVE-2024-1111",
                  "PkgName": "github.com/b/indirect",
                  "InstalledVersion": "v0.1.0",
                  "FixedVersion": "v0.2.0",
                  "Severity": "HIGH",
                  "CVSS": {
                    "nvd": {"V3Score": 7.5},
                    "ghsa": {"V3Score": 8.1}
                  }
                }
              ]
            },
            {"Type": "npm", "Vulnerabilities": [{"VulnerabilityID": "ignored"}]}
          ]
        }"#;
        let report: TrivyReport = serde_json::from_str(raw).unwrap();
        let result = convert_report(report, Path::new("/work/go.mod"));

        assert_eq!(result.findings.len(), 1);
        let f = &result.findings[0];
        assert_eq!(f.vulnerability_id, "CVE-2024-1111");
        assert!(f.indirect);
        assert_eq!(f.cvss_score, 8.1);
    }

    #[test]
    fn test_contains_matches_id_and_package() {
        let raw = r#"{"Results": [{"Type": "gomod", "Vulnerabilities": [
            {"VulnerabilityID": "CVE-1", "PkgName": "lib/a"}
        ]}]}"#;
        let report: TrivyReport = serde_json::from_str(raw).unwrap();
        let result = convert_report(report, Path::new("go.mod"));
        assert!(result.contains("CVE-1", "lib/a"));
        assert!(!result.contains("CVE-1", "lib/b"));
        assert!(!result.contains("CVE-2", "lib/a"));
    }
}
