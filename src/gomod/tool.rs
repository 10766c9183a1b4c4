//! Go toolchain collaborators: manifest mutation and the why/graph oracles.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::errors::AutobumpError;
use crate::models::GraphEdge;

use super::graph::parse_graph_output;
use super::version::normalize_version;

/// Applies updates to a manifest directory through the toolchain.
///
/// The version string "latest" means "highest available satisfying policy".
#[async_trait]
pub trait ManifestMutator: Send + Sync {
    async fn get(&self, module_dir: &Path, pkg: &str, version: &str) -> Result<(), AutobumpError>;
    async fn tidy(&self, module_dir: &Path) -> Result<(), AutobumpError>;
}

/// Answers "why is this module required" with the requirement chain,
/// one module path per line, comment lines already removed.
#[async_trait]
pub trait ChainOracle: Send + Sync {
    async fn why(&self, module_dir: &Path, pkg: &str) -> Result<Vec<String>, AutobumpError>;
}

/// Produces the resolved module graph for a manifest directory.
#[async_trait]
pub trait GraphOracle: Send + Sync {
    async fn graph(&self, module_dir: &Path) -> Result<Vec<GraphEdge>, AutobumpError>;
}

/// The real `go` binary.
pub struct GoTool;

impl GoTool {
    async fn run(
        &self,
        module_dir: &Path,
        args: &[&str],
    ) -> Result<std::process::Output, AutobumpError> {
        debug!(dir = %module_dir.display(), ?args, "go");
        Command::new("go")
            .args(args)
            .current_dir(module_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| AutobumpError::Mutation(format!("failed to spawn go: {e}")))
    }
}

#[async_trait]
impl ManifestMutator for GoTool {
    async fn get(&self, module_dir: &Path, pkg: &str, version: &str) -> Result<(), AutobumpError> {
        let target = format!("{}@{}", pkg, normalize_version(version));
        let output = self.run(module_dir, &["get", &target]).await?;
        if !output.status.success() {
            return Err(AutobumpError::Mutation(format!(
                "go get {target} failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }

    async fn tidy(&self, module_dir: &Path) -> Result<(), AutobumpError> {
        let output = self.run(module_dir, &["mod", "tidy"]).await?;
        if !output.status.success() {
            return Err(AutobumpError::Mutation(format!(
                "go mod tidy failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainOracle for GoTool {
    async fn why(&self, module_dir: &Path, pkg: &str) -> Result<Vec<String>, AutobumpError> {
        let output = self
            .run(module_dir, &["mod", "why", "-m", pkg])
            .await
            .map_err(|e| AutobumpError::Trace(e.to_string()))?;
        if !output.status.success() {
            return Err(AutobumpError::Trace(format!(
                "go mod why -m {pkg} failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let lines = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect();
        Ok(lines)
    }
}

#[async_trait]
impl GraphOracle for GoTool {
    async fn graph(&self, module_dir: &Path) -> Result<Vec<GraphEdge>, AutobumpError> {
        let output = self
            .run(module_dir, &["mod", "graph"])
            .await
            .map_err(|e| AutobumpError::Graph(e.to_string()))?;
        if !output.status.success() {
            return Err(AutobumpError::Graph(format!(
                "go mod graph failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(parse_graph_output(&String::from_utf8_lossy(&output.stdout)))
    }
}
