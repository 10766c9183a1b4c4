use serde::{Deserialize, Serialize};

/// A dependency declared in a go.mod manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub path: String,
    pub version: String,
    /// True when the require entry carries an `// indirect` marker.
    pub indirect: bool,
}

/// A module path pinned to a version, as it appears in `go mod graph` output.
///
/// The version is empty for the root module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleVersion {
    pub path: String,
    pub version: String,
}

impl ModuleVersion {
    /// Parse "module@version" or a bare "module".
    pub fn parse(s: &str) -> Self {
        match s.rsplit_once('@') {
            Some((path, version)) => Self {
                path: path.to_string(),
                version: version.to_string(),
            },
            None => Self {
                path: s.to_string(),
                version: String::new(),
            },
        }
    }
}

/// One "from requires to" edge in the resolved module graph.
///
/// The graph is a directed multigraph: the same base path can appear at
/// several major versions at once, as distinct nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: ModuleVersion,
    pub to: ModuleVersion,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_module_with_version() {
        let mv = ModuleVersion::parse("github.com/foo/bar@v1.2.3");
        assert_eq!(mv.path, "github.com/foo/bar");
        assert_eq!(mv.version, "v1.2.3");
    }

    #[test]
    fn test_parse_root_module_without_version() {
        let mv = ModuleVersion::parse("github.com/my/module");
        assert_eq!(mv.path, "github.com/my/module");
        assert!(mv.version.is_empty());
    }
}
