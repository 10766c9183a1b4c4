pub mod parser;
pub mod schema;
pub mod types;

pub use parser::{default_config_path, parse_config, CONFIG_FILE};
pub use types::{AiConfig, Config, ResolverPolicy};
