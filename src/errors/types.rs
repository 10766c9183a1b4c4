use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutobumpError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scan error: {0}")]
    Scan(String),

    #[error("Major version bump blocked: {0}")]
    Policy(String),

    #[error("Manifest update error: {0}")]
    Mutation(String),

    #[error("Dependency trace error: {0}")]
    Trace(String),

    #[error("Module graph error: {0}")]
    Graph(String),

    #[error("Manifest parse error: {0}")]
    Parse(String),

    #[error("LLM API error: {0}")]
    LLMApi(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
