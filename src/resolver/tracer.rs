//! Chain tracing: which direct dependency pulls in a vulnerable package.

use tracing::debug;

use crate::gomod::{ChainOracle, ModFile};

/// Where a remediation candidate came from. A traced candidate carries a
/// stronger guarantee than a namespace match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    /// Named by the explicit requirement-chain trace.
    Trace,
    /// Shares the vulnerable package's host/org namespace.
    Namespace,
}

/// A dependency whose update may pull in the fix for a vulnerable package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: String,
    pub source: CandidateSource,
}

/// Discovers remediation candidates for an indirect vulnerable package.
pub struct ChainTracer<'a> {
    modfile: &'a ModFile,
    oracle: &'a dyn ChainOracle,
}

impl<'a> ChainTracer<'a> {
    pub fn new(modfile: &'a ModFile, oracle: &'a dyn ChainOracle) -> Self {
        Self { modfile, oracle }
    }

    /// Ordered, deduplicated candidate sequence: explicit-trace hits first,
    /// then same-namespace dependencies. The vulnerable package itself never
    /// appears, and each owning module path appears at most once. The caller
    /// consumes the sequence with early exit on the first success.
    pub async fn candidates(&self, vuln_pkg: &str) -> Vec<Candidate> {
        let mut out: Vec<Candidate> = Vec::new();

        for path in self.trace_candidates(vuln_pkg).await {
            if path != vuln_pkg && !out.iter().any(|c| c.path == path) {
                out.push(Candidate {
                    path,
                    source: CandidateSource::Trace,
                });
            }
        }

        for path in self.namespace_candidates(vuln_pkg) {
            if path != vuln_pkg && !out.iter().any(|c| c.path == path) {
                out.push(Candidate {
                    path,
                    source: CandidateSource::Namespace,
                });
            }
        }

        out
    }

    /// Ask the chain oracle why the package is required. The first module
    /// line after the manifest's own root entry is the proximate step that
    /// introduces the chain. Oracle failure means "no candidates", not a
    /// hard error.
    async fn trace_candidates(&self, vuln_pkg: &str) -> Vec<String> {
        let lines = match self.oracle.why(self.modfile.module_dir(), vuln_pkg).await {
            Ok(lines) => lines,
            Err(e) => {
                debug!(pkg = vuln_pkg, error = %e, "chain trace unavailable");
                return Vec::new();
            }
        };

        // The first line is always the root module, or a parenthesized
        // "(main module does not need module ...)" notice when the chain
        // does not exist. Either way it is not a candidate.
        for line in lines.iter().skip(1) {
            if line.starts_with('(') {
                continue;
            }
            let resolved = self
                .modfile
                .owning_module(line)
                .map(str::to_string)
                .unwrap_or_else(|| line.clone());
            return vec![resolved];
        }
        Vec::new()
    }

    /// Same-namespace fallback: sibling packages under one host/org are
    /// typically released and fixed together. Direct dependencies are
    /// preferred; indirect ones are consulted only when no direct sibling
    /// exists.
    fn namespace_candidates(&self, vuln_pkg: &str) -> Vec<String> {
        let Some(ns) = namespace(vuln_pkg) else {
            return Vec::new();
        };

        let direct: Vec<String> = self
            .modfile
            .direct_dependencies()
            .filter(|d| namespace(&d.path) == Some(ns))
            .map(|d| d.path.clone())
            .collect();
        if !direct.is_empty() {
            return direct;
        }

        self.modfile
            .indirect_dependencies()
            .filter(|d| d.path != vuln_pkg && namespace(&d.path) == Some(ns))
            .map(|d| d.path.clone())
            .collect()
    }
}

/// First two path segments (host + organization), e.g. "github.com/org".
/// Single-segment paths have no namespace.
fn namespace(path: &str) -> Option<&str> {
    let mut end = 0;
    let mut segments = 0;
    for (i, c) in path.char_indices() {
        if c == '/' {
            segments += 1;
            if segments == 2 {
                end = i;
                break;
            }
        }
    }
    if segments >= 2 {
        Some(&path[..end])
    } else if segments == 1 {
        Some(path)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AutobumpError;
    use async_trait::async_trait;
    use std::path::Path;

    struct FakeOracle {
        lines: Result<Vec<String>, String>,
    }

    #[async_trait]
    impl ChainOracle for FakeOracle {
        async fn why(&self, _dir: &Path, _pkg: &str) -> Result<Vec<String>, AutobumpError> {
            self.lines
                .clone()
                .map_err(AutobumpError::Trace)
        }
    }

    const GOMOD: &str = r#"
module github.com/my/module

require (
	github.com/aws/aws-sdk-go-v2 v1.20.0
	github.com/direct/dep v1.4.0
	github.com/aws/smithy-go v1.13.0 // indirect
	github.com/aws/aws-sdk-go-v2/internal/ini v1.3.0 // indirect
)
"#;

    fn modfile() -> ModFile {
        ModFile::parse(Path::new("/work/go.mod"), GOMOD).unwrap()
    }

    #[tokio::test]
    async fn test_explicit_trace_resolves_to_owning_module() {
        let mf = modfile();
        let oracle = FakeOracle {
            lines: Ok(vec![
                "github.com/my/module".to_string(),
                "github.com/direct/dep/subpkg".to_string(),
                "github.com/vuln/pkg".to_string(),
            ]),
        };
        let tracer = ChainTracer::new(&mf, &oracle);
        let candidates = tracer.candidates("github.com/vuln/pkg").await;
        assert_eq!(candidates[0].path, "github.com/direct/dep");
        assert_eq!(candidates[0].source, CandidateSource::Trace);
    }

    #[tokio::test]
    async fn test_namespace_fallback_prefers_direct_siblings() {
        let mf = modfile();
        let oracle = FakeOracle { lines: Ok(vec![]) };
        let tracer = ChainTracer::new(&mf, &oracle);
        let candidates = tracer.candidates("github.com/aws/smithy-go").await;
        // Direct sibling under github.com/aws wins; the indirect siblings are
        // not consulted when a direct one exists.
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].path, "github.com/aws/aws-sdk-go-v2");
        assert_eq!(candidates[0].source, CandidateSource::Namespace);
    }

    #[tokio::test]
    async fn test_oracle_failure_falls_through_to_namespace() {
        let mf = modfile();
        let oracle = FakeOracle {
            lines: Err("go mod why exploded".to_string()),
        };
        let tracer = ChainTracer::new(&mf, &oracle);
        let candidates = tracer.candidates("github.com/aws/smithy-go").await;
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].source, CandidateSource::Namespace);
    }

    #[tokio::test]
    async fn test_no_self_and_no_duplicates() {
        let mf = modfile();
        // Trace names the same module the namespace scan would find.
        let oracle = FakeOracle {
            lines: Ok(vec![
                "github.com/my/module".to_string(),
                "github.com/aws/aws-sdk-go-v2/service/s3".to_string(),
            ]),
        };
        let tracer = ChainTracer::new(&mf, &oracle);
        let candidates = tracer.candidates("github.com/aws/smithy-go").await;
        let paths: Vec<_> = candidates.iter().map(|c| c.path.as_str()).collect();
        assert!(!paths.contains(&"github.com/aws/smithy-go"));
        let mut deduped = paths.clone();
        deduped.dedup();
        assert_eq!(paths, deduped);
        assert_eq!(candidates[0].source, CandidateSource::Trace);
    }

    #[tokio::test]
    async fn test_not_needed_notice_is_not_a_candidate() {
        let mf = modfile();
        // "go mod why -m" reports an unneeded module with a parenthesized
        // notice instead of a chain; it must never be treated as a module.
        let oracle = FakeOracle {
            lines: Ok(vec![
                "(main module does not need module github.com/aws/smithy-go)".to_string(),
            ]),
        };
        let tracer = ChainTracer::new(&mf, &oracle);
        let candidates = tracer.candidates("github.com/aws/smithy-go").await;
        assert!(candidates.iter().all(|c| !c.path.starts_with('(')));
        // Only the namespace fallback remains.
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].path, "github.com/aws/aws-sdk-go-v2");
        assert_eq!(candidates[0].source, CandidateSource::Namespace);
    }

    #[tokio::test]
    async fn test_empty_when_nothing_matches() {
        let mf = modfile();
        let oracle = FakeOracle { lines: Ok(vec![]) };
        let tracer = ChainTracer::new(&mf, &oracle);
        let candidates = tracer.candidates("gopkg.in/yaml.v3").await;
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_namespace_extraction() {
        assert_eq!(namespace("github.com/org/repo"), Some("github.com/org"));
        assert_eq!(namespace("github.com/org"), Some("github.com/org"));
        assert_eq!(namespace("stdlib"), None);
    }
}
