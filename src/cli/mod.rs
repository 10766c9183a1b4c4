pub mod commands;
pub mod scan;
pub mod update;

pub use commands::{Cli, Commands};

use crate::config::{self, Config};
use crate::errors::{AutobumpError, FailureScope};

/// Load the config file named on the command line, or the default
/// `.autobump.yaml` when one exists, or built-in defaults otherwise.
pub(crate) async fn load_file_config(path: Option<&str>) -> Result<Config, AutobumpError> {
    match path {
        Some(path) => config::parse_config(std::path::Path::new(path)).await,
        None => match config::default_config_path() {
            Some(path) => config::parse_config(&path).await,
            None => Ok(Config::default()),
        },
    }
}

/// Whether an error hit while processing one manifest should abandon the
/// whole run instead of skipping to the next manifest.
pub(crate) fn abandons_run(e: &AutobumpError) -> bool {
    e.classify().scope == FailureScope::Run
}
