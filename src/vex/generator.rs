//! OpenVEX document generation for the unresolved set.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AutobumpError;
use crate::gomod::ChainOracle;
use crate::llm::LLMProvider;
use crate::resolver::UnresolvedFinding;

const OPENVEX_CONTEXT: &str = "https://openvex.dev/ns/v0.2.0";
const VALID_STATUSES: [&str; 4] = ["not_affected", "affected", "fixed", "under_investigation"];

/// How long the AI justification oracle may take per finding.
const JUSTIFY_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenVEX document, compatible with trivy's `--vex openvex` flag.
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenVexDocument {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@id")]
    pub id: String,
    pub author: String,
    pub timestamp: String,
    pub version: u32,
    pub tooling: String,
    pub statements: Vec<Statement>,
}

/// One VEX statement for a specific vulnerability.
#[derive(Debug, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "vulnerability")]
    pub vulnerability_id: String,
    pub products: Vec<Product>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact_statement: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifiers: Option<Identifiers>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Identifiers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purl: Option<String>,
}

/// AI-proposed exploitability assessment for one statement.
#[derive(Debug, Deserialize)]
struct AiJustification {
    status: String,
    #[serde(default)]
    justification: Option<String>,
    #[serde(default)]
    impact_statement: Option<String>,
}

/// Builds OpenVEX documents for findings the resolver could not fix.
///
/// With an AI provider attached, each statement's status is proposed by the
/// model from the finding and its requirement chain; anything that errors,
/// times out, or comes back invalid degrades to `under_investigation`.
pub struct VexGenerator {
    ai: Option<Arc<dyn LLMProvider>>,
    chain: Arc<dyn ChainOracle>,
}

impl VexGenerator {
    pub fn new(chain: Arc<dyn ChainOracle>, ai: Option<Arc<dyn LLMProvider>>) -> Self {
        Self { ai, chain }
    }

    pub async fn generate(&self, entries: &[UnresolvedFinding]) -> OpenVexDocument {
        let now = Utc::now();
        let mut doc = OpenVexDocument {
            context: OPENVEX_CONTEXT.to_string(),
            id: format!("https://autobump/vex/{}", now.timestamp()),
            author: "autobump".to_string(),
            timestamp: now.to_rfc3339(),
            version: 1,
            tooling: "autobump".to_string(),
            statements: Vec::with_capacity(entries.len()),
        };

        for entry in entries {
            doc.statements.push(self.statement_for(entry).await);
        }
        doc
    }

    pub async fn write(&self, doc: &OpenVexDocument, path: &Path) -> Result<(), AutobumpError> {
        let output = serde_json::to_vec_pretty(doc)?;
        tokio::fs::write(path, output).await?;
        Ok(())
    }

    async fn statement_for(&self, entry: &UnresolvedFinding) -> Statement {
        let finding = &entry.finding;
        let mut stmt = Statement {
            vulnerability_id: finding.vulnerability_id.clone(),
            products: vec![Product {
                id: finding.pkg_name.clone(),
                identifiers: Some(Identifiers {
                    purl: Some(finding.purl()),
                }),
            }],
            status: "under_investigation".to_string(),
            justification: None,
            impact_statement: Some(format!(
                "No automated remediation for {} in {}@{} ({}). Requires manual analysis.",
                finding.vulnerability_id,
                finding.pkg_name,
                finding.installed_version,
                entry.reason_code
            )),
            timestamp: Utc::now().to_rfc3339(),
        };

        if let Some(ai) = &self.ai {
            match self.justify(ai.as_ref(), entry).await {
                Ok(justification) => {
                    stmt.status = justification.status;
                    stmt.justification = justification.justification;
                    if justification.impact_statement.is_some() {
                        stmt.impact_statement = justification.impact_statement;
                    }
                }
                Err(e) => {
                    warn!(
                        vulnerability = %finding.vulnerability_id,
                        error = %e,
                        "AI justification failed, keeping under_investigation"
                    );
                }
            }
        }

        stmt
    }

    async fn justify(
        &self,
        ai: &dyn LLMProvider,
        entry: &UnresolvedFinding,
    ) -> Result<AiJustification, AutobumpError> {
        let chain_text = match self.chain.why(&entry.module_dir, &entry.finding.pkg_name).await {
            Ok(lines) => lines.join("\n"),
            Err(_) => "Unable to determine dependency chain".to_string(),
        };

        let prompt = justification_prompt(entry, &chain_text);
        let response = tokio::time::timeout(
            JUSTIFY_TIMEOUT,
            ai.complete(&prompt, Some(JUSTIFICATION_SYSTEM_PROMPT)),
        )
        .await
        .map_err(|_| AutobumpError::Timeout("AI justification timed out".into()))??;

        parse_justification(&response)
    }
}

const JUSTIFICATION_SYSTEM_PROMPT: &str = "\
You are a security expert helping to create VEX (Vulnerability Exploitability eXchange) documents.
Your task is to analyze vulnerabilities and determine if they are exploitable in the context of how the package is used.

Respond with a JSON object in OpenVEX format containing:
- \"status\": one of \"not_affected\", \"affected\", \"fixed\", or \"under_investigation\"
- \"justification\": if status is \"not_affected\", one of: \"component_not_present\", \"vulnerable_code_not_reachable\", \"vulnerable_code_cannot_be_controlled_by_adversary\", \"inline_mitigations_already_exist\"
- \"impact_statement\": a brief explanation of why this status was chosen

Only respond with the JSON object, no additional text.";

fn justification_prompt(entry: &UnresolvedFinding, chain_text: &str) -> String {
    format!(
        "Analyze this vulnerability:\n\n\
         Vulnerability ID: {}\n\
         Package: {}\n\
         Description: {}\n\n\
         Dependency chain (from 'go mod why'):\n{}\n\n\
         Based on how this dependency is used (as shown in the dependency chain), \
         determine if the vulnerability is likely exploitable.\n\
         If you cannot determine exploitability, use \"under_investigation\" status.",
        entry.finding.vulnerability_id, entry.finding.pkg_name, entry.finding.description, chain_text
    )
}

fn parse_justification(response: &str) -> Result<AiJustification, AutobumpError> {
    let mut justification: AiJustification = serde_json::from_str(response.trim())
        .map_err(|e| AutobumpError::LLMApi(format!("failed to parse AI response: {e}")))?;
    if !VALID_STATUSES.contains(&justification.status.as_str()) {
        justification.status = "under_investigation".to_string();
        justification.justification = None;
    }
    Ok(justification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::PathBuf;

    struct NoChain;

    #[async_trait]
    impl ChainOracle for NoChain {
        async fn why(&self, _dir: &Path, _pkg: &str) -> Result<Vec<String>, AutobumpError> {
            Err(AutobumpError::Trace("unavailable".into()))
        }
    }

    struct CannedProvider {
        response: Result<String, String>,
    }

    #[async_trait]
    impl LLMProvider for CannedProvider {
        async fn complete(
            &self,
            _prompt: &str,
            _system: Option<&str>,
        ) -> Result<String, AutobumpError> {
            self.response.clone().map_err(AutobumpError::LLMApi)
        }

        fn provider_name(&self) -> &str {
            "canned"
        }

        fn model_name(&self) -> &str {
            "canned-1"
        }
    }

    fn entry(id: &str) -> UnresolvedFinding {
        UnresolvedFinding {
            finding: crate::models::Finding {
                vulnerability_id: id.into(),
                pkg_name: "github.com/foo/bar".into(),
                installed_version: "v1.0.0".into(),
                fixed_version: String::new(),
                severity: "HIGH".into(),
                title: String::new(),
                description: "a bug".into(),
                primary_url: String::new(),
                cvss: HashMap::new(),
                cvss_score: 8.0,
                indirect: true,
            },
            module_dir: PathBuf::from("/work"),
            reason_code: "skipped-no-fix",
            reason: "no fixed version".into(),
        }
    }

    #[tokio::test]
    async fn test_without_ai_statements_are_under_investigation() {
        let gen = VexGenerator::new(Arc::new(NoChain), None);
        let doc = gen.generate(&[entry("CVE-1"), entry("CVE-2")]).await;
        assert_eq!(doc.context, OPENVEX_CONTEXT);
        assert_eq!(doc.statements.len(), 2);
        for stmt in &doc.statements {
            assert_eq!(stmt.status, "under_investigation");
            assert!(stmt.impact_statement.as_deref().unwrap().contains("manual analysis"));
        }
        let purl = doc.statements[0].products[0]
            .identifiers
            .as_ref()
            .unwrap()
            .purl
            .as_deref()
            .unwrap();
        assert_eq!(purl, "pkg:golang/github.com/foo/bar@v1.0.0");
    }

    #[tokio::test]
    async fn test_valid_ai_status_is_used() {
        let ai = CannedProvider {
            response: Ok(r#"{"status": "not_affected", "justification": "vulnerable_code_not_reachable", "impact_statement": "code path unused"}"#.into()),
        };
        let gen = VexGenerator::new(Arc::new(NoChain), Some(Arc::new(ai)));
        let doc = gen.generate(&[entry("CVE-3")]).await;
        let stmt = &doc.statements[0];
        assert_eq!(stmt.status, "not_affected");
        assert_eq!(stmt.justification.as_deref(), Some("vulnerable_code_not_reachable"));
        assert_eq!(stmt.impact_statement.as_deref(), Some("code path unused"));
    }

    #[tokio::test]
    async fn test_invalid_ai_status_degrades() {
        let ai = CannedProvider {
            response: Ok(r#"{"status": "exploitable!!", "impact_statement": "bad"}"#.into()),
        };
        let gen = VexGenerator::new(Arc::new(NoChain), Some(Arc::new(ai)));
        let doc = gen.generate(&[entry("CVE-4")]).await;
        assert_eq!(doc.statements[0].status, "under_investigation");
        assert!(doc.statements[0].justification.is_none());
    }

    #[tokio::test]
    async fn test_ai_error_degrades() {
        let ai = CannedProvider {
            response: Err("boom".into()),
        };
        let gen = VexGenerator::new(Arc::new(NoChain), Some(Arc::new(ai)));
        let doc = gen.generate(&[entry("CVE-5")]).await;
        let stmt = &doc.statements[0];
        assert_eq!(stmt.status, "under_investigation");
        assert!(stmt.impact_statement.as_deref().unwrap().contains("manual analysis"));
    }

    #[tokio::test]
    async fn test_unparseable_ai_output_degrades() {
        let ai = CannedProvider {
            response: Ok("sorry, as a language model I cannot".into()),
        };
        let gen = VexGenerator::new(Arc::new(NoChain), Some(Arc::new(ai)));
        let doc = gen.generate(&[entry("CVE-6")]).await;
        assert_eq!(doc.statements[0].status, "under_investigation");
    }
}
