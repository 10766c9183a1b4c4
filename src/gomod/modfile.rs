//! Read-only view of a go.mod manifest's dependency declarations.

use std::path::{Path, PathBuf};

use crate::errors::AutobumpError;
use crate::models::Dependency;

use super::version::{major_variant_path, strip_major_suffix};

/// Parsed go.mod manifest: module path plus require entries.
///
/// Read path only; mutation goes through the `go` toolchain, never through
/// this type.
#[derive(Debug, Clone)]
pub struct ModFile {
    pub path: PathBuf,
    module_path: String,
    requires: Vec<Dependency>,
}

impl ModFile {
    pub async fn load(gomod_path: &Path) -> Result<Self, AutobumpError> {
        let content = tokio::fs::read_to_string(gomod_path).await.map_err(|e| {
            AutobumpError::Parse(format!("failed to read {}: {e}", gomod_path.display()))
        })?;
        Self::parse(gomod_path, &content)
    }

    pub fn parse(gomod_path: &Path, content: &str) -> Result<Self, AutobumpError> {
        let mut module_path = String::new();
        let mut requires = Vec::new();
        let mut in_require_block = false;

        for raw in content.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if in_require_block {
                if line == ")" {
                    in_require_block = false;
                } else if let Some(dep) = parse_require_line(line) {
                    requires.push(dep);
                }
                continue;
            }

            if let Some(rest) = line.strip_prefix("module ") {
                module_path = rest.trim().trim_matches('"').to_string();
            } else if line == "require (" {
                in_require_block = true;
            } else if let Some(rest) = line.strip_prefix("require ") {
                if let Some(dep) = parse_require_line(rest.trim()) {
                    requires.push(dep);
                }
            }
        }

        if module_path.is_empty() {
            return Err(AutobumpError::Parse(format!(
                "no module directive in {}",
                gomod_path.display()
            )));
        }

        Ok(Self {
            path: gomod_path.to_path_buf(),
            module_path,
            requires,
        })
    }

    /// The root module path declared by the manifest.
    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    /// Directory containing the manifest, where toolchain commands run.
    pub fn module_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn direct_dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.requires.iter().filter(|d| !d.indirect)
    }

    pub fn indirect_dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.requires.iter().filter(|d| d.indirect)
    }

    pub fn declares(&self, pkg_path: &str) -> bool {
        self.requires.iter().any(|d| d.path == pkg_path)
    }

    pub fn is_direct(&self, pkg_path: &str) -> bool {
        self.requires
            .iter()
            .any(|d| d.path == pkg_path && !d.indirect)
    }

    /// Declared version of a dependency; empty when the path is not required.
    pub fn version_of(&self, pkg_path: &str) -> String {
        self.requires
            .iter()
            .find(|d| d.path == pkg_path)
            .map(|d| d.version.clone())
            .unwrap_or_default()
    }

    /// Whether the manifest already declares the `/vN` variant implied by a
    /// fixed version's major component, and whether the lower-major
    /// vulnerable module is still present alongside it.
    ///
    /// Returns (variant declared version, vulnerable module still present).
    pub fn major_variant_state(
        &self,
        vuln_pkg: &str,
        fixed_version: &str,
    ) -> (Option<String>, bool) {
        let Some(target) = major_variant_path(vuln_pkg, fixed_version) else {
            return (None, self.declares(vuln_pkg));
        };
        let variant = self
            .requires
            .iter()
            .find(|d| d.path == target)
            .map(|d| d.version.clone());
        (variant, self.declares(vuln_pkg))
    }

    /// Resolve a raw import-style path to the module that owns it, by
    /// longest-prefix match against every declared dependency path.
    pub fn owning_module(&self, import_path: &str) -> Option<&str> {
        self.requires
            .iter()
            .filter(|d| {
                import_path == d.path
                    || import_path.starts_with(&format!("{}/", d.path))
                    || strip_major_suffix(&d.path) == import_path
            })
            .max_by_key(|d| d.path.len())
            .map(|d| d.path.as_str())
    }
}

fn parse_require_line(line: &str) -> Option<Dependency> {
    // Lines look like: "github.com/foo/bar v1.2.3" or
    // "github.com/foo/baz v0.4.0 // indirect"
    if line.starts_with("//") {
        return None;
    }
    let (entry, comment) = match line.split_once("//") {
        Some((entry, comment)) => (entry.trim(), comment.trim()),
        None => (line, ""),
    };
    let mut fields = entry.split_whitespace();
    let path = fields.next()?.trim_matches('"').to_string();
    let version = fields.next()?.to_string();
    Some(Dependency {
        path,
        version,
        indirect: comment.starts_with("indirect"),
    })
}
