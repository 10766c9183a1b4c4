use serde::{Deserialize, Serialize};

/// Terminal state of the remediation state machine for one finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The vulnerable package itself was updated to its fixed version.
    FixedDirect,
    /// A direct dependency identified by the explicit chain trace was
    /// updated and the rescan came back clean.
    FixedViaChain,
    /// A same-namespace dependency was updated and the rescan came back
    /// clean. Weaker guarantee than a traced fix.
    FixedViaNamespaceFallback,
    /// The fix requires a major version bump and the policy forbids it.
    SkippedMajorVersionBlocked,
    /// The advisory carries no fixed version.
    SkippedNoFix,
    /// Every remediation strategy was exhausted without clearing the finding.
    Failed,
}

impl Outcome {
    pub fn is_fixed(&self) -> bool {
        matches!(
            self,
            Outcome::FixedDirect | Outcome::FixedViaChain | Outcome::FixedViaNamespaceFallback
        )
    }

    /// Human-readable reason code mirroring the outcome.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Outcome::FixedDirect => "fixed-direct",
            Outcome::FixedViaChain => "fixed-via-chain",
            Outcome::FixedViaNamespaceFallback => "fixed-via-namespace-fallback",
            Outcome::SkippedMajorVersionBlocked => "skipped-major-version-blocked",
            Outcome::SkippedNoFix => "skipped-no-fix",
            Outcome::Failed => "failed",
        }
    }
}

/// Outcome plus the human-readable detail recorded by the resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub outcome: Outcome,
    pub reason: String,
}

impl Resolution {
    pub fn new(outcome: Outcome, reason: impl Into<String>) -> Self {
        Self {
            outcome,
            reason: reason.into(),
        }
    }
}
