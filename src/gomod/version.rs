//! Version policy: major-bump classification and version normalization.

/// Extract the leading numeric component of a semver-ish version string.
///
/// A leading `v` marker and anything after the first `.`, `-` or `+` are
/// ignored. Unparseable input yields 0.
fn extract_major(version: &str) -> u64 {
    let version = version.strip_prefix('v').unwrap_or(version);
    let end = version
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(version.len());
    version[..end].parse().unwrap_or(0)
}

/// True iff moving from `old` to `new` raises the leading version component.
///
/// Callers must special-case "latest" and the empty string; neither is a
/// comparable version.
pub fn is_major_bump(old: &str, new: &str) -> bool {
    extract_major(new) > extract_major(old)
}

/// Ensure a version string carries the `v` marker Go modules expect.
///
/// Bare numeric versions get the prefix ("1.2.3" -> "v1.2.3"); "latest",
/// the empty string, and already-marked versions pass through unchanged.
pub fn normalize_version(version: &str) -> String {
    if version == "latest" || version.is_empty() {
        return version.to_string();
    }
    if version.starts_with('v') {
        return version.to_string();
    }
    if version.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return format!("v{version}");
    }
    version.to_string()
}

/// Remove a trailing `/vN` (N >= 2) semantic-import-versioning suffix.
pub fn strip_major_suffix(path: &str) -> &str {
    let Some((prefix, last)) = path.rsplit_once('/') else {
        return path;
    };
    let mut chars = last.chars();
    if chars.next() == Some('v')
        && last.len() >= 2
        && last[1..].chars().all(|c| c.is_ascii_digit())
        && !last[1..].starts_with('0')
        && last[1..].parse::<u64>().map_or(false, |n| n >= 2)
    {
        prefix
    } else {
        path
    }
}

/// Module path without its major-version suffix, for grouping graph nodes
/// into base module families.
pub fn base_path(path: &str) -> &str {
    strip_major_suffix(path)
}

/// The `/vN` module path implied by a fixed version with major N >= 2, or
/// None when the fix stays within v0/v1.
pub fn major_variant_path(pkg_path: &str, fixed_version: &str) -> Option<String> {
    let major = extract_major(fixed_version);
    if major < 2 {
        return None;
    }
    Some(format!("{}/v{}", strip_major_suffix(pkg_path), major))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_bump_detected() {
        assert!(is_major_bump("v1.2.3", "v2.0.0"));
        assert!(is_major_bump("v0.1.0", "v1.0.0"));
    }

    #[test]
    fn test_minor_and_patch_are_not_major() {
        assert!(!is_major_bump("v1.2.3", "v1.9.9"));
        assert!(!is_major_bump("v1.2.3", "v1.2.4"));
    }

    #[test]
    fn test_same_version_never_major() {
        for v in ["v1.2.3", "v0.0.1", "2.0.0", "v3.0.0-rc.1"] {
            assert!(!is_major_bump(v, v), "bump reported for {v}");
        }
    }

    #[test]
    fn test_downgrade_is_not_major() {
        assert!(!is_major_bump("v2.0.0", "v1.9.9"));
    }

    #[test]
    fn test_prerelease_suffix_ignored() {
        assert!(is_major_bump("v1.2.3", "v2.0.0-beta.1+build5"));
    }

    #[test]
    fn test_normalize_adds_marker_to_bare_numeric() {
        assert_eq!(normalize_version("1.2.3"), "v1.2.3");
    }

    #[test]
    fn test_normalize_passthrough() {
        assert_eq!(normalize_version("v1.2.3"), "v1.2.3");
        assert_eq!(normalize_version("latest"), "latest");
        assert_eq!(normalize_version(""), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        for v in ["1.2.3", "v1.2.3", "latest", "", "0.4.0-rc1"] {
            let once = normalize_version(v);
            assert_eq!(normalize_version(&once), once);
        }
    }

    #[test]
    fn test_strip_major_suffix() {
        assert_eq!(strip_major_suffix("github.com/foo/bar/v2"), "github.com/foo/bar");
        assert_eq!(strip_major_suffix("github.com/foo/bar/v10"), "github.com/foo/bar");
        assert_eq!(strip_major_suffix("github.com/foo/bar"), "github.com/foo/bar");
        // v1 is never a path suffix
        assert_eq!(strip_major_suffix("github.com/foo/v1"), "github.com/foo/v1");
        // not a version component
        assert_eq!(strip_major_suffix("github.com/foo/v2x"), "github.com/foo/v2x");
    }

    #[test]
    fn test_major_variant_path() {
        assert_eq!(
            major_variant_path("github.com/foo/bar", "2.1.0"),
            Some("github.com/foo/bar/v2".to_string())
        );
        assert_eq!(
            major_variant_path("github.com/foo/bar/v2", "v3.0.0"),
            Some("github.com/foo/bar/v3".to_string())
        );
        assert_eq!(major_variant_path("github.com/foo/bar", "v1.4.0"), None);
    }
}
