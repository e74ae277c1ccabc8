//! Custom backend example: plug an in-memory index into the bridge.
//!
//! This example shows how to:
//! - Implement the `Backend` trait
//! - Register it in a `ModuleRegistry` under the package layout
//! - Run one request through the `Bridge` and inspect the outcome
//!
//! Run with: cargo run --example custom_backend

use async_trait::async_trait;
use auditor_bridge::prelude::*;
use serde_json::{json, Value};

/// Looks up query terms in a fixed keyword table.
#[derive(Debug)]
struct KeywordIndex {
    entries: Vec<(&'static str, &'static str)>,
}

impl KeywordIndex {
    fn new() -> Self {
        Self {
            entries: vec![
                ("tokens", "https://paste.example/a1"),
                ("invoices", "https://forum.example/t/881"),
                ("passwords", "https://dump.example/p/17"),
            ],
        }
    }
}

#[async_trait]
impl Backend for KeywordIndex {
    fn name(&self) -> &str {
        "keyword-index"
    }

    async fn search(&self, query: &str, _use_proxy: bool) -> Result<Vec<Value>, BackendError> {
        let query = query.to_lowercase();
        let hits = self
            .entries
            .iter()
            .filter(|(keyword, _)| query.contains(keyword))
            .map(|(keyword, url)| {
                json!({
                    "type": "mention",
                    "title": format!("'{}' mentioned", keyword),
                    "url": url,
                })
            })
            .collect();

        Ok(hits)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("auditor_bridge=info")
        .init();

    let base = std::env::temp_dir().join(format!("auditor-demo-{}", std::process::id()));
    let vendor = base.join("vendor").join("engine");
    std::fs::create_dir_all(&vendor)?;

    let registry = ModuleRegistry::new(&vendor)
        .with_module(Module::new("engine.search", &vendor).with_search(KeywordIndex::new()));

    let bridge = Bridge::builder()
        .with_config(BridgeConfig::new().with_base_dir(&base))
        .with_registry(registry)
        .without_delivery()
        .build()?;

    let input = base.join("request.json");
    std::fs::write(&input, r#"{"query": "leaked tokens and invoices"}"#)?;
    let output = base.join("result.json");

    let outcome = bridge.run_guarded(&input, &output).await;

    println!("Status:  {}", outcome.status);
    println!("Summary: {}", outcome.result.summary);
    for (i, finding) in outcome.result.findings.iter().enumerate() {
        println!("  {:03}. {}", i + 1, finding);
    }
    println!("Log:");
    for line in &outcome.result.log_lines {
        println!("  {}", line);
    }
    println!("Result written to {}", output.display());

    Ok(())
}
