use async_trait::async_trait;
use auditor_bridge::prelude::*;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Backend that echoes its arguments as findings.
#[derive(Debug)]
struct EchoBackend;

#[async_trait]
impl Backend for EchoBackend {
    fn name(&self) -> &str {
        "echo"
    }

    async fn search(&self, query: &str, use_proxy: bool) -> Result<Vec<Value>, BackendError> {
        Ok(vec![
            json!({"type": "echo", "title": query, "url": "https://echo.local/q"}),
            json!({"detail": format!("proxy={}", use_proxy), "location": null}),
        ])
    }
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn base(&self) -> &Path {
        self.dir.path()
    }

    fn vendor(&self) -> PathBuf {
        let vendor = self.base().join("vendor").join("engine");
        std::fs::create_dir_all(&vendor).unwrap();
        vendor
    }

    fn request(&self, body: Value) -> PathBuf {
        let path = self.base().join("request.json");
        std::fs::write(&path, body.to_string()).unwrap();
        path
    }

    fn output(&self) -> PathBuf {
        self.base().join("out.json")
    }

    fn bridge(&self, registry: ModuleRegistry) -> Bridge {
        Bridge::builder()
            .with_config(BridgeConfig::new().with_base_dir(self.base()))
            .with_registry(registry)
            .build()
            .unwrap()
    }

    fn reports(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.base().join("reports"))
            .map(|entries| entries.map(|e| e.unwrap().path()).collect())
            .unwrap_or_default()
    }
}

#[tokio::test]
async fn custom_backend_findings_are_normalized() {
    let fx = Fixture::new();
    let vendor = fx.vendor();
    let registry = ModuleRegistry::new(&vendor).with_module(Module::new("search", &vendor).with_search(EchoBackend));

    let input = fx.request(json!({"query": "leaked keys", "use_tor": true}));
    let outcome = fx.bridge(registry).run_guarded(&input, &fx.output()).await;

    assert_eq!(outcome.status, ExitStatus::Success);
    assert_eq!(
        outcome.result.findings,
        vec![
            Finding::new("echo", "leaked keys", "https://echo.local/q"),
            Finding::new("result", "proxy=true", "N/A"),
        ]
    );
    assert_eq!(outcome.result.summary, "Engine search completed. Collected 2 result(s).");

    let report = std::fs::read_to_string(&fx.reports()[0]).unwrap();
    assert!(report.contains("001. [echo] leaked keys   @ https://echo.local/q"));
    assert!(report.contains("002. [result] proxy=true   @ N/A"));
}

#[tokio::test]
async fn log_lines_follow_run_order() {
    let fx = Fixture::new();
    let vendor = fx.vendor();
    let registry = ModuleRegistry::new(&vendor).with_module(Module::new("engine.search", &vendor).with_search(EchoBackend));

    let input = fx.request(json!({"query": "q"}));
    let outcome = fx.bridge(registry).run_guarded(&input, &fx.output()).await;
    let lines = &outcome.result.log_lines;

    let position = |prefix: &str| {
        lines
            .iter()
            .position(|l| l.starts_with(prefix))
            .unwrap_or_else(|| panic!("missing line starting with {prefix:?}: {lines:#?}"))
    };

    let start = position("auditor-bridge start:");
    let request = position("Request:");
    let flat = position("flat lookup 'search' failed");
    let module = position("Engine module OK:");
    let call = position("Calling engine search()");
    let returned = position("Engine search() returned 2 item(s)");
    let saved = position("Report saved:");

    assert!(start < request && request < flat && flat < module);
    assert!(module < call && call < returned && returned < saved);
    assert_eq!(saved, lines.len() - 1);
}

#[tokio::test]
async fn backend_panic_is_fatal_but_reported() {
    let fx = Fixture::new();
    let vendor = fx.vendor();
    let registry = ModuleRegistry::new(&vendor)
        .with_module(Module::new("search", &vendor).with_search(MockBackend::panicking("index corrupted")));

    let input = fx.request(json!({"query": "q"}));
    let outcome = fx.bridge(registry).run_guarded(&input, &fx.output()).await;

    assert_eq!(outcome.status, ExitStatus::Fatal);
    assert_eq!(outcome.status.code(), 99);
    assert_eq!(outcome.result.summary, "Bridge crashed: index corrupted");
    assert!(outcome.result.findings.is_empty());

    let lines = &outcome.result.log_lines;
    assert!(lines.len() > 1);
    assert!(lines[0].starts_with("auditor-bridge start:"));
    assert!(lines.iter().any(|l| l.starts_with("Calling engine search()")));
    assert_eq!(lines.last().unwrap(), "index corrupted");
}

#[tokio::test]
async fn request_with_both_key_spellings_is_accepted() {
    let fx = Fixture::new();
    let vendor = fx.vendor();
    let backend = Arc::new(MockBackend::new());
    let registry = ModuleRegistry::new(&vendor)
        .with_module(Module::new("search", &vendor).with_export("search", Export::Search(backend.clone())));

    let input = fx.request(json!({"query": "q", "use_tor": false, "use_anonymizing_proxy": true}));
    let outcome = fx.bridge(registry).run_guarded(&input, &fx.output()).await;

    assert_eq!(outcome.status, ExitStatus::Success);
    assert_eq!(backend.last_call(), Some(("q".to_string(), true)));
}

#[tokio::test]
async fn array_request_is_input_error() {
    let fx = Fixture::new();
    let vendor = fx.vendor();
    let backend = Arc::new(MockBackend::new());
    let registry = ModuleRegistry::new(&vendor)
        .with_module(Module::new("search", &vendor).with_export("search", Export::Search(backend.clone())));

    let input = fx.request(json!(["tokens", true]));
    let outcome = fx.bridge(registry).run_guarded(&input, &fx.output()).await;

    assert_eq!(outcome.status, ExitStatus::InputError);
    assert_eq!(outcome.result.summary, "Input error: request could not be read.");
    assert_eq!(backend.search_count(), 0);
}

#[tokio::test]
async fn shared_backend_sees_request_arguments() {
    let fx = Fixture::new();
    let vendor = fx.vendor();
    let backend = Arc::new(MockBackend::new().with_findings(vec![Finding::notice("ok")]));
    let registry = ModuleRegistry::new(&vendor)
        .with_module(Module::new("search", &vendor).with_export("search", Export::Search(backend.clone())));

    let input = fx.request(json!({"query": "  invoices  ", "use_anonymizing_proxy": true}));
    let outcome = fx.bridge(registry).run_guarded(&input, &fx.output()).await;

    assert!(outcome.status.is_success());
    assert_eq!(backend.search_count(), 1);
    assert_eq!(backend.last_call(), Some(("invoices".to_string(), true)));
}

#[tokio::test]
async fn result_file_matches_returned_result() {
    let fx = Fixture::new();
    let vendor = fx.vendor();
    let registry = ModuleRegistry::new(&vendor).with_module(Module::new("search", &vendor).with_search(EchoBackend));

    let input = fx.request(json!({"query": "q"}));
    let outcome = fx.bridge(registry).run_guarded(&input, &fx.output()).await;

    let written: ScanResult = serde_json::from_str(&std::fs::read_to_string(fx.output()).unwrap()).unwrap();
    assert_eq!(written, outcome.result);
}

#[cfg(feature = "http")]
mod collector {
    use super::*;
    use auditor_bridge::bridge::SECRET_HEADER;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn collector_receives_snapshot_before_post_line() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header(SECRET_HEADER, "tok-123"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let fx = Fixture::new();
        let vendor = fx.vendor();
        let registry =
            ModuleRegistry::new(&vendor).with_module(Module::new("search", &vendor).with_search(EchoBackend));

        let input = fx.request(json!({
            "query": "q",
            "webhook_url": format!("{}/hook", server.uri()),
            "webhook_secret": "tok-123",
        }));
        let outcome = fx.bridge(registry).run_guarded(&input, &fx.output()).await;

        assert!(outcome.status.is_success());
        let lines = &outcome.result.log_lines;
        assert!(lines.last().unwrap().ends_with("[status=202]"));
        assert!(lines.iter().all(|l| !l.contains("tok-123")));

        let received = server.received_requests().await.unwrap();
        let payload: ScanResult = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(payload.findings, outcome.result.findings);
        assert_eq!(payload.summary, outcome.result.summary);
        assert_eq!(payload.log_lines.len() + 1, lines.len());
        assert!(payload.log_lines.iter().all(|l| !l.starts_with("Collector POST")));
    }

    #[tokio::test]
    async fn collector_error_status_is_not_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fx = Fixture::new();
        let input = fx.request(json!({"webhook_url": server.uri()}));
        let outcome = fx.bridge(ModuleRegistry::new(fx.base().join("missing"))).run_guarded(&input, &fx.output()).await;

        assert_eq!(outcome.status, ExitStatus::Success);
        assert!(outcome
            .result
            .log_lines
            .iter()
            .any(|l| l.starts_with("Collector POST ->") && l.ends_with("[status=500]")));
    }
}
