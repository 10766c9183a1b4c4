use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use autobump::errors::AutobumpError;
use autobump::gomod::ChainOracle;
use autobump::models::Finding;
use autobump::resolver::UnresolvedFinding;
use autobump::vex::{OpenVexDocument, VexGenerator};

struct StaticChain;

#[async_trait]
impl ChainOracle for StaticChain {
    async fn why(&self, _dir: &Path, pkg: &str) -> Result<Vec<String>, AutobumpError> {
        Ok(vec![
            "github.com/my/module".to_string(),
            "github.com/direct/dep".to_string(),
            pkg.to_string(),
        ])
    }
}

fn unresolved(id: &str, pkg: &str) -> UnresolvedFinding {
    UnresolvedFinding {
        finding: Finding {
            vulnerability_id: id.to_string(),
            pkg_name: pkg.to_string(),
            installed_version: "v0.3.0".to_string(),
            fixed_version: String::new(),
            severity: "CRITICAL".to_string(),
            title: "test advisory".to_string(),
            description: "remotely triggerable parser crash".to_string(),
            primary_url: String::new(),
            cvss: HashMap::new(),
            cvss_score: 9.1,
            indirect: true,
        },
        module_dir: PathBuf::from("/work"),
        reason_code: "skipped-no-fix",
        reason: "no fixed version published".to_string(),
    }
}

#[tokio::test]
async fn vex_document_round_trips_and_covers_all_entries() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("out.openvex.json");

    let generator = VexGenerator::new(Arc::new(StaticChain), None);
    let entries = vec![
        unresolved("CVE-2024-0001", "github.com/acme/vuln"),
        unresolved("CVE-2024-0002", "golang.org/x/crypto"),
    ];
    let doc = generator.generate(&entries).await;
    generator.write(&doc, &output).await.unwrap();

    let raw = std::fs::read_to_string(&output).unwrap();
    let parsed: OpenVexDocument = serde_json::from_str(&raw).unwrap();

    assert_eq!(parsed.context, "https://openvex.dev/ns/v0.2.0");
    assert_eq!(parsed.author, "autobump");
    assert_eq!(parsed.statements.len(), 2);

    let ids: Vec<_> = parsed
        .statements
        .iter()
        .map(|s| s.vulnerability_id.as_str())
        .collect();
    assert_eq!(ids, vec!["CVE-2024-0001", "CVE-2024-0002"]);

    for stmt in &parsed.statements {
        // No AI attached: everything stays under investigation.
        assert_eq!(stmt.status, "under_investigation");
        let purl = stmt.products[0]
            .identifiers
            .as_ref()
            .unwrap()
            .purl
            .as_deref()
            .unwrap();
        assert!(purl.starts_with("pkg:golang/"));
        assert!(purl.ends_with("@v0.3.0"));
    }

    // The raw document keeps the OpenVEX field spellings trivy expects.
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(value.get("@context").is_some());
    assert!(value.get("@id").is_some());
    assert!(value["statements"][0].get("vulnerability").is_some());
}
