use super::types::AutobumpError;

/// How far an error propagates before the run has to give up on something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureScope {
    /// Recoverable at the finding level: fall through to the next strategy
    /// (or candidate), and record a terminal outcome once exhausted.
    Finding,
    /// Fatal for the current manifest: skip it and continue with the next.
    Manifest,
    /// Fatal for the whole run.
    Run,
}

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub scope: FailureScope,
}

impl AutobumpError {
    /// Classify this error into its failure scope.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Recoverable per finding
            AutobumpError::Policy(_) => ErrorClassification {
                error_type: "PolicyError",
                scope: FailureScope::Finding,
            },
            AutobumpError::Mutation(_) => ErrorClassification {
                error_type: "MutationError",
                scope: FailureScope::Finding,
            },
            AutobumpError::Trace(_) => ErrorClassification {
                error_type: "TraceError",
                scope: FailureScope::Finding,
            },
            AutobumpError::Graph(_) => ErrorClassification {
                error_type: "GraphError",
                scope: FailureScope::Finding,
            },
            // The AI oracle always degrades to a safe default status
            AutobumpError::LLMApi(_) => ErrorClassification {
                error_type: "LLMApiError",
                scope: FailureScope::Finding,
            },
            AutobumpError::Network(_) => ErrorClassification {
                error_type: "NetworkError",
                scope: FailureScope::Finding,
            },
            AutobumpError::Timeout(_) => ErrorClassification {
                error_type: "TimeoutError",
                scope: FailureScope::Finding,
            },

            // Fatal for the manifest
            AutobumpError::Scan(_) => ErrorClassification {
                error_type: "ScanError",
                scope: FailureScope::Manifest,
            },
            AutobumpError::Parse(_) => ErrorClassification {
                error_type: "ParseError",
                scope: FailureScope::Manifest,
            },

            // Fatal for the run
            AutobumpError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                scope: FailureScope::Run,
            },
            AutobumpError::Authentication(_) => ErrorClassification {
                error_type: "AuthenticationError",
                scope: FailureScope::Run,
            },

            AutobumpError::Io(_) => ErrorClassification {
                error_type: "IoError",
                scope: FailureScope::Manifest,
            },
            AutobumpError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                scope: FailureScope::Manifest,
            },
            AutobumpError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                scope: FailureScope::Run,
            },
            AutobumpError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                scope: FailureScope::Run,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_error_recoverable_per_finding() {
        let err = AutobumpError::Policy("v1 -> v2".into());
        let class = err.classify();
        assert_eq!(class.scope, FailureScope::Finding);
        assert_eq!(class.error_type, "PolicyError");
    }

    #[test]
    fn test_scan_error_fatal_for_manifest() {
        let err = AutobumpError::Scan("trivy not found".into());
        assert_eq!(err.classify().scope, FailureScope::Manifest);
    }

    #[test]
    fn test_config_error_fatal_for_run() {
        let err = AutobumpError::Config("bad threshold".into());
        assert_eq!(err.classify().scope, FailureScope::Run);
    }
}
