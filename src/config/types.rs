use serde::{Deserialize, Serialize};

/// Full run configuration: file values merged with CLI flags and env vars,
/// built once in the CLI layer and passed into every collaborator. Core
/// logic never consults ambient state.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Target directory to scan.
    pub path: String,

    /// Glob patterns excluded from manifest discovery, matched against
    /// root-relative paths.
    pub exclude: Vec<String>,

    /// Minimum CVSS score to act on (inclusive).
    pub cvss_threshold: f64,

    /// Disable `go mod tidy` after updates.
    pub skip_tidy: bool,

    /// Preview changes without applying them.
    pub dry_run: bool,

    /// Permit major version bumps (e.g. v1 -> v2).
    pub allow_major: bool,

    /// Skip trivy's vulnerability DB refresh.
    pub skip_db_update: bool,

    /// Emit an OpenVEX document for unfixed findings.
    pub generate_vex: bool,

    /// Output path for the VEX document.
    pub vex_output: String,

    /// AI provider used for VEX justifications.
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AiConfig {
    /// API key; also read from AUTOBUMP_AI_API_KEY / OPENAI_API_KEY.
    pub api_key: Option<String>,

    /// OpenAI-compatible endpoint.
    pub endpoint: String,

    /// Model identifier.
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: ".".to_string(),
            exclude: Vec::new(),
            cvss_threshold: 7.0,
            skip_tidy: false,
            dry_run: false,
            allow_major: false,
            skip_db_update: false,
            generate_vex: false,
            vex_output: ".vex.openvex.json".to_string(),
            ai: AiConfig::default(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
        }
    }
}

impl Config {
    /// The slice of configuration the resolver's state machine needs.
    pub fn resolver_policy(&self) -> ResolverPolicy {
        ResolverPolicy {
            allow_major: self.allow_major,
            skip_tidy: self.skip_tidy,
        }
    }
}

/// Policy knobs consulted by the remediation state machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolverPolicy {
    pub allow_major: bool,
    pub skip_tidy: bool,
}
