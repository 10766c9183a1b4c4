use std::path::Path;

use console::style;
use tracing::warn;

use crate::cli::commands::ScanArgs;
use crate::config::Config;
use crate::errors::AutobumpError;
use crate::models::ScanResult;
use crate::scanner::{discover_manifests, filter_by_cvss, TrivyScanner, VulnScanner};

pub async fn handle_scan(args: ScanArgs) -> Result<(), AutobumpError> {
    let config = build_scan_config(&args).await?;

    let manifests = discover_manifests(Path::new(&config.path), &config.exclude)?;
    if manifests.is_empty() {
        println!("No go.mod files found");
        return Ok(());
    }
    eprintln!("Found {} go.mod file(s)", manifests.len());

    let scanner = TrivyScanner {
        skip_db_update: config.skip_db_update,
    };

    let mut results: Vec<ScanResult> = Vec::new();
    let mut scan_failures = 0usize;
    for manifest in &manifests {
        eprintln!("Scanning {}...", manifest.display());
        let result = match scanner.scan(manifest).await {
            Ok(result) => result,
            Err(e) => {
                if super::abandons_run(&e) {
                    return Err(e);
                }
                warn!(manifest = %manifest.display(), error = %e, "scan failed");
                scan_failures += 1;
                continue;
            }
        };
        let filtered = filter_by_cvss(&result, config.cvss_threshold);
        if !filtered.findings.is_empty() {
            results.push(filtered);
        }
    }

    if results.is_empty() {
        println!(
            "No vulnerabilities found above CVSS threshold {:.1}",
            config.cvss_threshold
        );
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(&results, config.cvss_threshold);
    }

    if scan_failures > 0 {
        return Err(AutobumpError::Scan(format!(
            "{scan_failures} manifest(s) could not be scanned"
        )));
    }
    Ok(())
}

async fn build_scan_config(args: &ScanArgs) -> Result<Config, AutobumpError> {
    let mut config = super::load_file_config(args.config.as_deref()).await?;
    config.path = args.path.clone();
    if !args.exclude.is_empty() {
        config.exclude = args.exclude.clone();
    }
    if let Some(threshold) = args.cvss_threshold {
        config.cvss_threshold = threshold;
    }
    config.skip_db_update |= args.skip_db_update;
    Ok(config)
}

fn print_results(results: &[ScanResult], threshold: f64) {
    println!("\nVulnerabilities found (CVSS >= {threshold:.1}):");
    println!("{}", "=".repeat(100));

    let mut total = 0usize;
    for result in results {
        println!("\n{}", style(&result.target).bold());
        println!("{}", "-".repeat(100));
        println!(
            "{:<20} {:<40} {:<12} {:<12} {:<8} {}",
            "CVE", "Package", "Installed", "Fixed", "CVSS", "Direct"
        );
        println!("{}", "-".repeat(100));

        for finding in &result.findings {
            let fixed = if finding.fixed_version.is_empty() {
                "(none)"
            } else {
                &finding.fixed_version
            };
            println!(
                "{:<20} {:<40} {:<12} {:<12} {:<8.1} {}",
                truncate(&finding.vulnerability_id, 20),
                truncate(&finding.pkg_name, 40),
                truncate(&finding.installed_version, 12),
                truncate(fixed, 12),
                finding.cvss_score,
                if finding.indirect { "no" } else { "yes" },
            );
            total += 1;
        }
    }

    println!("{}", "=".repeat(100));
    println!("Total: {} vulnerabilities in {} module(s)", total, results.len());
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_input_unchanged() {
        assert_eq!(truncate("CVE-2024-0001", 20), "CVE-2024-0001");
    }

    #[test]
    fn test_truncate_long_input_keeps_ellipsis() {
        assert_eq!(truncate("github.com/some/very/long/path", 12), "github.co...");
    }

    #[test]
    fn test_truncate_cuts_on_character_boundaries() {
        // Multibyte characters in advisory titles must not split mid-char.
        let s = "héllo wörld with ümlauts and ëxtra length";
        let out = truncate(s, 12);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 12);
    }
}
