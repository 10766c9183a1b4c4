//! Accessor over the resolved module graph reported by `go mod graph`.

use std::collections::BTreeSet;

use crate::models::{GraphEdge, ModuleVersion};

use super::version::base_path;

/// Read-only view of the resolved dependency graph.
///
/// Nodes are path@version pairs; multiple major-version variants of one base
/// path coexist as distinct nodes.
#[derive(Debug, Clone, Default)]
pub struct DepGraph {
    edges: Vec<GraphEdge>,
}

impl DepGraph {
    pub fn new(edges: Vec<GraphEdge>) -> Self {
        Self { edges }
    }

    /// Every version at which any module of the given base family appears as
    /// a requiring node, with `/vN` path suffixes stripped for the grouping
    /// but full paths preserved on the nodes themselves.
    pub fn versions_of_base(&self, base: &str) -> Vec<String> {
        let mut versions = BTreeSet::new();
        for edge in &self.edges {
            if base_path(&edge.from.path) == base && !edge.from.version.is_empty() {
                versions.insert(edge.from.version.clone());
            }
        }
        versions.into_iter().collect()
    }

}

/// Parse `go mod graph` output: one "from@version to@version" pair per line.
pub fn parse_graph_output(output: &str) -> Vec<GraphEdge> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let (from, to) = line.split_once(char::is_whitespace)?;
            let to = to.trim();
            if to.is_empty() {
                return None;
            }
            Some(GraphEdge {
                from: ModuleVersion::parse(from),
                to: ModuleVersion::parse(to),
            })
        })
        .collect()
}
