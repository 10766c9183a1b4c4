use std::path::Path;
use std::sync::Arc;

use console::style;
use tracing::{info, warn};

use crate::cli::commands::UpdateArgs;
use crate::config::Config;
use crate::errors::AutobumpError;
use crate::gomod::{GoTool, ModFile};
use crate::llm::{LLMProvider, OpenAIProvider};
use crate::models::Outcome;
use crate::resolver::{RemediationResolver, UnresolvedReport};
use crate::scanner::{discover_manifests, filter_by_cvss, TrivyScanner, VulnScanner};
use crate::vex::VexGenerator;

pub async fn handle_update(args: UpdateArgs) -> Result<(), AutobumpError> {
    let config = build_update_config(&args).await?;

    let manifests = discover_manifests(Path::new(&config.path), &config.exclude)?;
    if manifests.is_empty() {
        println!("No go.mod files found");
        return Ok(());
    }
    eprintln!("Found {} go.mod file(s)", manifests.len());

    let scanner: Arc<dyn VulnScanner> = Arc::new(TrivyScanner {
        skip_db_update: config.skip_db_update,
    });
    let gotool = Arc::new(GoTool);
    let resolver = RemediationResolver::new(
        config.resolver_policy(),
        scanner.clone(),
        gotool.clone(),
        gotool.clone(),
        gotool.clone(),
    );

    let mut unresolved = UnresolvedReport::new();
    let mut scan_failures = 0usize;

    // Manifests are remediated one at a time, and findings within one
    // manifest strictly in scan order: the manifest directory is a single
    // shared mutable resource.
    for manifest in &manifests {
        eprintln!("\n{} {}", style(">").cyan().bold(), manifest.display());

        let result = match scanner.scan(manifest).await {
            Ok(result) => result,
            Err(e) => {
                if super::abandons_run(&e) {
                    return Err(e);
                }
                warn!(manifest = %manifest.display(), error = %e, "scan failed, skipping manifest");
                scan_failures += 1;
                continue;
            }
        };

        let filtered = filter_by_cvss(&result, config.cvss_threshold);
        if filtered.findings.is_empty() {
            eprintln!(
                "  {} no vulnerabilities above CVSS {:.1}",
                style("ok").green(),
                config.cvss_threshold
            );
            continue;
        }
        eprintln!(
            "  found {} vulnerabilities above CVSS {:.1}",
            filtered.findings.len(),
            config.cvss_threshold
        );

        // Parsed up front only to reject unreadable manifests; the resolver
        // re-reads go.mod before every finding, since each fix mutates it.
        let modfile = match ModFile::load(manifest).await {
            Ok(modfile) => modfile,
            Err(e) => {
                if super::abandons_run(&e) {
                    return Err(e);
                }
                warn!(manifest = %manifest.display(), error = %e, "manifest unreadable, skipping");
                scan_failures += 1;
                continue;
            }
        };
        let module_dir = modfile.module_dir().to_path_buf();
        info!(module = %modfile.module_path(), findings = filtered.findings.len(), "remediating manifest");

        for finding in &filtered.findings {
            if config.dry_run {
                if finding.has_fixed_version() {
                    eprintln!(
                        "  {} would update {}: {} -> {}",
                        style("dry-run").yellow(),
                        finding.pkg_name,
                        finding.installed_version,
                        finding.fixed_version
                    );
                } else {
                    eprintln!(
                        "  {} {} in {}: no fix available",
                        style("dry-run").yellow(),
                        finding.vulnerability_id,
                        finding.pkg_name
                    );
                }
                continue;
            }

            let resolution = resolver.resolve_fresh(manifest, finding).await;
            let tag = match resolution.outcome {
                Outcome::FixedDirect
                | Outcome::FixedViaChain
                | Outcome::FixedViaNamespaceFallback => style(resolution.outcome.reason_code()).green(),
                Outcome::SkippedMajorVersionBlocked | Outcome::SkippedNoFix => {
                    style(resolution.outcome.reason_code()).yellow()
                }
                Outcome::Failed => style(resolution.outcome.reason_code()).red(),
            };
            eprintln!(
                "  {} {} in {}: {}",
                tag, finding.vulnerability_id, finding.pkg_name, resolution.reason
            );
            unresolved.record(finding, &resolution, &module_dir);
        }
    }

    if !config.dry_run && !unresolved.is_empty() {
        eprintln!(
            "\n{} finding(s) left unresolved",
            style(unresolved.len()).yellow()
        );
        if config.generate_vex {
            generate_vex(&config, &unresolved, gotool).await?;
        }
    }

    // Unresolved vulnerabilities are a normal, reportable outcome; only a
    // manifest that could not be scanned at all fails the run.
    if scan_failures > 0 {
        return Err(AutobumpError::Scan(format!(
            "{scan_failures} manifest(s) could not be scanned"
        )));
    }
    Ok(())
}

async fn generate_vex(
    config: &Config,
    unresolved: &UnresolvedReport,
    gotool: Arc<GoTool>,
) -> Result<(), AutobumpError> {
    eprintln!(
        "Generating VEX document for {} unresolved finding(s)...",
        unresolved.len()
    );

    let ai: Option<Arc<dyn LLMProvider>> = config.ai.api_key.as_deref().map(|key| {
        Arc::new(OpenAIProvider::new(
            key,
            Some(&config.ai.endpoint),
            Some(&config.ai.model),
        )) as Arc<dyn LLMProvider>
    });

    let generator = VexGenerator::new(gotool, ai);
    let doc = generator.generate(unresolved.entries()).await;
    let output = Path::new(&config.vex_output);
    generator.write(&doc, output).await?;
    info!(path = %output.display(), statements = doc.statements.len(), "VEX document written");
    eprintln!("  VEX document written to {}", output.display());
    Ok(())
}

async fn build_update_config(args: &UpdateArgs) -> Result<Config, AutobumpError> {
    let mut config = super::load_file_config(args.config.as_deref()).await?;
    config.path = args.path.clone();
    if !args.exclude.is_empty() {
        config.exclude = args.exclude.clone();
    }
    if let Some(threshold) = args.cvss_threshold {
        config.cvss_threshold = threshold;
    }
    config.allow_major |= args.allow_major;
    config.skip_tidy |= args.skip_tidy;
    config.dry_run |= args.dry_run;
    config.skip_db_update |= args.skip_db_update;
    config.generate_vex |= args.generate_vex;
    if let Some(vex_output) = &args.vex_output {
        config.vex_output = vex_output.clone();
    }
    if let Some(key) = &args.ai_api_key {
        config.ai.api_key = Some(key.clone());
    }
    if config.ai.api_key.is_none() {
        config.ai.api_key = std::env::var("AUTOBUMP_AI_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok();
    }
    if let Some(endpoint) = &args.ai_endpoint {
        config.ai.endpoint = endpoint.clone();
    }
    if let Some(model) = &args.ai_model {
        config.ai.model = model.clone();
    }
    Ok(config)
}
