//! The remediation state machine: one pass over a finding, falling back
//! through successive update strategies until the manifest is clean or no
//! automated action remains.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ResolverPolicy;
use crate::errors::AutobumpError;
use crate::gomod::version::{base_path, major_variant_path};
use crate::gomod::{is_major_bump, ChainOracle, DepGraph, GraphOracle, ManifestMutator, ModFile};
use crate::models::{Finding, Outcome, Resolution};
use crate::scanner::VulnScanner;

use super::tracer::{CandidateSource, ChainTracer};

/// Decides whether and how to update a manifest for one finding, verifies
/// the fix by rescanning, and records the terminal outcome.
///
/// Strictly sequential per manifest: the on-disk go.mod is a single shared
/// mutable resource, and interleaving tidy/update runs on it is a
/// correctness hazard.
pub struct RemediationResolver {
    policy: ResolverPolicy,
    scanner: Arc<dyn VulnScanner>,
    mutator: Arc<dyn ManifestMutator>,
    chain: Arc<dyn ChainOracle>,
    graph: Arc<dyn GraphOracle>,
}

impl RemediationResolver {
    pub fn new(
        policy: ResolverPolicy,
        scanner: Arc<dyn VulnScanner>,
        mutator: Arc<dyn ManifestMutator>,
        chain: Arc<dyn ChainOracle>,
        graph: Arc<dyn GraphOracle>,
    ) -> Self {
        Self {
            policy,
            scanner,
            mutator,
            chain,
            graph,
        }
    }

    /// Re-read the manifest, then run the state machine for a single
    /// finding. Earlier findings in the same run mutate go.mod through
    /// get/tidy, so routing must never reuse a view parsed before them.
    pub async fn resolve_fresh(&self, manifest_path: &Path, finding: &Finding) -> Resolution {
        match ModFile::load(manifest_path).await {
            Ok(modfile) => self.resolve(&modfile, finding).await,
            Err(e) => Resolution::new(Outcome::Failed, format!("manifest reload failed: {e}")),
        }
    }

    /// Run the state machine for a single finding.
    pub async fn resolve(&self, modfile: &ModFile, finding: &Finding) -> Resolution {
        if !finding.has_fixed_version() {
            return Resolution::new(
                Outcome::SkippedNoFix,
                format!("no fixed version published for {}", finding.vulnerability_id),
            );
        }

        // The manifest's declaration wins over the scanner's directness flag;
        // the flag is only trusted for packages the manifest does not declare.
        let direct = if modfile.declares(&finding.pkg_name) {
            modfile.is_direct(&finding.pkg_name)
        } else {
            !finding.indirect
        };

        if direct {
            self.resolve_direct(modfile, finding).await
        } else {
            self.resolve_indirect(modfile, finding).await
        }
    }

    /// Direct dependency: update the vulnerable package itself.
    async fn resolve_direct(&self, modfile: &ModFile, finding: &Finding) -> Resolution {
        if let Some(mut blocked) = self.check_major_gate(
            &finding.pkg_name,
            &finding.installed_version,
            &finding.fixed_version,
        ) {
            // When the manifest already requires the /vN module the fix
            // lives in, the operator can migrate imports instead of bumping.
            let (variant, _) =
                modfile.major_variant_state(&finding.pkg_name, &finding.fixed_version);
            if let (Some(declared), Some(variant_path)) = (
                variant,
                major_variant_path(&finding.pkg_name, &finding.fixed_version),
            ) {
                blocked
                    .reason
                    .push_str(&format!("; manifest already requires {variant_path} at {declared}"));
            }
            return blocked;
        }

        info!(
            pkg = %finding.pkg_name,
            from = %finding.installed_version,
            to = %finding.fixed_version,
            "updating direct dependency"
        );
        if let Err(e) = self
            .mutator
            .get(modfile.module_dir(), &finding.pkg_name, &finding.fixed_version)
            .await
        {
            return Resolution::new(Outcome::Failed, format!("update failed: {e}"));
        }
        if let Err(e) = self.tidy(modfile).await {
            return Resolution::new(Outcome::Failed, format!("tidy failed: {e}"));
        }

        Resolution::new(
            Outcome::FixedDirect,
            format!(
                "{} updated {} -> {}",
                finding.pkg_name, finding.installed_version, finding.fixed_version
            ),
        )
    }

    /// Indirect dependency: first try updating the vulnerable package as if
    /// it were direct; if the toolchain refuses, or accepts without actually
    /// moving the effective resolved version, trace the requirement chain.
    async fn resolve_indirect(&self, modfile: &ModFile, finding: &Finding) -> Resolution {
        info!(
            pkg = %finding.pkg_name,
            from = %finding.installed_version,
            to = %finding.fixed_version,
            "attempting self-update of indirect dependency"
        );

        if self
            .mutator
            .get(modfile.module_dir(), &finding.pkg_name, &finding.fixed_version)
            .await
            .is_err()
        {
            info!(pkg = %finding.pkg_name, "self-update rejected, tracing dependency chain");
            return self.trace_chain(modfile, finding).await;
        }

        if let Err(e) = self.tidy(modfile).await {
            info!(pkg = %finding.pkg_name, error = %e, "tidy after self-update failed, tracing dependency chain");
            return self.trace_chain(modfile, finding).await;
        }

        // The rescan is the sole source of truth: a go get can succeed while
        // another requirement still pins the vulnerable version.
        match self.scanner.scan(&modfile.path).await {
            Err(e) => Resolution::new(Outcome::Failed, format!("verification scan failed: {e}")),
            Ok(rescan) => {
                if rescan.contains(&finding.vulnerability_id, &finding.pkg_name) {
                    info!(
                        pkg = %finding.pkg_name,
                        "finding persists after self-update, tracing dependency chain"
                    );
                    self.trace_chain(modfile, finding).await
                } else {
                    Resolution::new(
                        Outcome::FixedDirect,
                        format!(
                            "{} updated {} -> {}",
                            finding.pkg_name, finding.installed_version, finding.fixed_version
                        ),
                    )
                }
            }
        }
    }

    /// Walk the candidate sequence in order, updating each candidate until
    /// one clears the finding on a fresh scan. Candidate failures are
    /// recorded and the next candidate is tried.
    async fn trace_chain(&self, modfile: &ModFile, finding: &Finding) -> Resolution {
        let tracer = ChainTracer::new(modfile, self.chain.as_ref());
        let candidates = tracer.candidates(&finding.pkg_name).await;
        if candidates.is_empty() {
            return Resolution::new(
                Outcome::Failed,
                format!(
                    "no direct dependency could be identified for {}",
                    finding.pkg_name
                ),
            );
        }

        let mut attempts: Vec<String> = Vec::new();
        for candidate in &candidates {
            let declared = modfile.version_of(&candidate.path);
            let target = self.resolve_target_version(modfile, &candidate.path).await;

            if target != "latest" && !declared.is_empty() {
                if let Some(blocked) =
                    self.check_major_gate(&candidate.path, &declared, &target)
                {
                    warn!(candidate = %candidate.path, "candidate blocked by major-bump policy");
                    attempts.push(blocked.reason);
                    continue;
                }
            }

            info!(candidate = %candidate.path, target = %target, "updating chain candidate");
            if let Err(e) = self
                .mutator
                .get(modfile.module_dir(), &candidate.path, &target)
                .await
            {
                warn!(candidate = %candidate.path, error = %e, "candidate update failed");
                attempts.push(format!("{}: {e}", candidate.path));
                continue;
            }
            if let Err(e) = self.tidy(modfile).await {
                warn!(candidate = %candidate.path, error = %e, "tidy failed after candidate update");
                attempts.push(format!("{}: tidy: {e}", candidate.path));
                continue;
            }

            match self.scanner.scan(&modfile.path).await {
                Err(e) => {
                    return Resolution::new(
                        Outcome::Failed,
                        format!("verification scan failed: {e}"),
                    );
                }
                Ok(rescan) => {
                    if !rescan.contains(&finding.vulnerability_id, &finding.pkg_name) {
                        let outcome = match candidate.source {
                            CandidateSource::Trace => Outcome::FixedViaChain,
                            CandidateSource::Namespace => Outcome::FixedViaNamespaceFallback,
                        };
                        return Resolution::new(
                            outcome,
                            format!(
                                "{} cleared by updating {} to {}",
                                finding.vulnerability_id, candidate.path, target
                            ),
                        );
                    }
                    attempts.push(format!("{}: finding persisted", candidate.path));
                }
            }
        }

        Resolution::new(
            Outcome::Failed,
            format!(
                "exhausted {} candidate(s) without clearing {}: {}",
                candidates.len(),
                finding.vulnerability_id,
                attempts.join("; ")
            ),
        )
    }

    /// Major-bump policy gate. Returns the terminal skip resolution when the
    /// transition raises the leading version component and the policy does
    /// not allow it.
    fn check_major_gate(&self, pkg: &str, old: &str, new: &str) -> Option<Resolution> {
        if !is_major_bump(old, new) {
            return None;
        }
        if self.policy.allow_major {
            warn!(pkg, from = old, to = new, "major version bump permitted by policy");
            return None;
        }
        Some(Resolution::new(
            Outcome::SkippedMajorVersionBlocked,
            format!("major version bump required for {pkg} ({old} -> {new}), use --allow-major to permit"),
        ))
    }

    async fn tidy(&self, modfile: &ModFile) -> Result<(), AutobumpError> {
        if self.policy.skip_tidy {
            return Ok(());
        }
        self.mutator.tidy(modfile.module_dir()).await
    }

    /// Pick the version to request for a chain candidate. The module graph
    /// carries no mapping from candidate releases to the advisory fix, so
    /// this is the unconstrained-latest fallback: a weaker guarantee than a
    /// version pinned to a known fix, and logged as such. Minimal version
    /// selection then resolves the rest.
    async fn resolve_target_version(&self, modfile: &ModFile, candidate: &str) -> String {
        match self.graph.graph(modfile.module_dir()).await {
            Ok(edges) => {
                let graph = DepGraph::new(edges);
                let versions = graph.versions_of_base(base_path(candidate));
                warn!(
                    candidate,
                    known_versions = versions.len(),
                    "no fix-pinned release known, using unconstrained latest fallback"
                );
            }
            Err(e) => {
                warn!(candidate, error = %e, "module graph unavailable, using unconstrained latest fallback");
            }
        }
        "latest".to_string()
    }
}
