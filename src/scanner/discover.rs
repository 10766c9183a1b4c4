//! Recursive go.mod discovery with glob-based exclusion.

use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::errors::AutobumpError;

/// Find every go.mod under `root`, skipping vendor trees, node_modules,
/// `.git`, and hidden directories. Exclusion patterns are matched against
/// the root-relative path of each manifest and against its directory.
pub fn discover_manifests(
    root: &Path,
    exclude_patterns: &[String],
) -> Result<Vec<PathBuf>, AutobumpError> {
    let abs_root = root
        .canonicalize()
        .map_err(|e| AutobumpError::Config(format!("invalid path {}: {e}", root.display())))?;

    let patterns: Vec<Pattern> = exclude_patterns
        .iter()
        .map(|p| {
            Pattern::new(p)
                .map_err(|e| AutobumpError::Config(format!("invalid exclude pattern {p}: {e}")))
        })
        .collect::<Result<_, _>>()?;

    let mut found = Vec::new();
    walk(&abs_root, &abs_root, &patterns, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk(
    root: &Path,
    dir: &Path,
    patterns: &[Pattern],
    found: &mut Vec<PathBuf>,
) -> Result<(), AutobumpError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if entry.file_type()?.is_dir() {
            if name == "vendor" || name == "node_modules" || name.starts_with('.') {
                continue;
            }
            walk(root, &path, patterns, found)?;
        } else if name == "go.mod" && !is_excluded(root, &path, patterns) {
            found.push(path);
        }
    }
    Ok(())
}

fn is_excluded(root: &Path, path: &Path, patterns: &[Pattern]) -> bool {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let rel_str = rel.to_string_lossy();
    let dir_str = rel
        .parent()
        .map(|d| d.to_string_lossy().into_owned())
        .unwrap_or_default();
    patterns
        .iter()
        .any(|p| p.matches(&rel_str) || p.matches(&dir_str))
}
