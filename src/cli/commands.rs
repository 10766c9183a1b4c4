use clap::{Args, Parser, Subcommand};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

#[derive(Parser)]
#[command(
    name = "autobump",
    version,
    long_version = LONG_VERSION,
    about = "Automated vulnerability remediation for Go module manifests"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan for vulnerable dependencies without changing anything
    Scan(ScanArgs),
    /// Scan and update vulnerable dependencies to fixed versions
    Update(UpdateArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone)]
pub struct ScanArgs {
    /// Target directory to scan
    #[arg(default_value = ".")]
    pub path: String,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Glob patterns to exclude from discovery
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Minimum CVSS score to report
    #[arg(long)]
    pub cvss_threshold: Option<f64>,

    /// Skip trivy's vulnerability DB refresh
    #[arg(long)]
    pub skip_db_update: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct UpdateArgs {
    /// Target directory to scan
    #[arg(default_value = ".")]
    pub path: String,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Glob patterns to exclude from discovery
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Minimum CVSS score to act on
    #[arg(long)]
    pub cvss_threshold: Option<f64>,

    /// Permit major version bumps (e.g. v1 -> v2)
    #[arg(long)]
    pub allow_major: bool,

    /// Do not run "go mod tidy" after updates
    #[arg(long)]
    pub skip_tidy: bool,

    /// Preview updates without applying them
    #[arg(long)]
    pub dry_run: bool,

    /// Skip trivy's vulnerability DB refresh
    #[arg(long)]
    pub skip_db_update: bool,

    /// Emit an OpenVEX document for unfixed findings
    #[arg(long)]
    pub generate_vex: bool,

    /// Output path for the VEX document
    #[arg(long)]
    pub vex_output: Option<String>,

    /// AI API key for VEX justifications (or use env vars)
    #[arg(long)]
    pub ai_api_key: Option<String>,

    /// OpenAI-compatible endpoint for VEX justifications
    #[arg(long)]
    pub ai_endpoint: Option<String>,

    /// Model identifier for VEX justifications
    #[arg(long)]
    pub ai_model: Option<String>,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Configuration file to validate
    #[arg(default_value = ".autobump.yaml")]
    pub config: String,
}
