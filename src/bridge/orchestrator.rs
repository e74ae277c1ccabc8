//! The bridge orchestrator.
//!
//! Drives one request end to end: load the request, run the engine resolver,
//! write the text report, deliver to the collector, write the result. Every
//! step after loading is fail-soft; only the primary output write changes
//! the exit status.

use crate::audit::{self, DeliveryAuditEvent, DeliveryOutcome, RunAuditEvent};
use crate::backends::PublicSearchBackend;
use crate::bridge::config::BridgeConfig;
use crate::bridge::delivery::CollectorDelivery;
use crate::bridge::report::write_report;
use crate::bridge::status::{ExitStatus, RunOutcome};
use crate::core::{BridgeError, BridgeResult, RunLog, ScanRequest, ScanResult};
use crate::engine::{EngineResolver, ModuleRegistry};
use crate::fetch::Fetcher;

use chrono::{Local, Utc};
use futures::FutureExt;
use secrecy::SecretString;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// Returns `summary`, or a synthesized one when it is empty.
pub fn finalize_summary(summary: String, finding_count: usize) -> String {
    if !summary.is_empty() {
        return summary;
    }
    format!(
        "Scan complete at {} with {} finding(s).",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        finding_count
    )
}

/// Extracts a readable message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

enum DeliverySetting {
    Default,
    Custom(CollectorDelivery),
    Disabled,
}

/// Builder for creating a [`Bridge`].
pub struct BridgeBuilder {
    config: BridgeConfig,
    registry: Option<ModuleRegistry>,
    delivery: DeliverySetting,
}

impl BridgeBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config: BridgeConfig::default(),
            registry: None,
            delivery: DeliverySetting::Default,
        }
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `registry` instead of the built-in engine.
    ///
    /// The registry root is the vendor directory checked for presence.
    pub fn with_registry(mut self, registry: ModuleRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the collector delivery client.
    pub fn with_delivery(mut self, delivery: CollectorDelivery) -> Self {
        self.delivery = DeliverySetting::Custom(delivery);
        self
    }

    /// Disables collector delivery; requests with a collector URL are logged
    /// and skipped.
    pub fn without_delivery(mut self) -> Self {
        self.delivery = DeliverySetting::Disabled;
        self
    }

    /// Builds the bridge.
    pub fn build(self) -> BridgeResult<Bridge> {
        self.config.validate()?;

        let registry = match self.registry {
            Some(registry) => registry,
            None => builtin_registry(&self.config),
        };

        let delivery = match self.delivery {
            DeliverySetting::Custom(delivery) => Some(delivery),
            DeliverySetting::Disabled => None,
            DeliverySetting::Default => match CollectorDelivery::new(self.config.collector_timeout) {
                Ok(delivery) => Some(delivery),
                Err(e) => {
                    tracing::warn!(error = %e, "Collector delivery unavailable");
                    None
                }
            },
        };

        Ok(Bridge {
            resolver: EngineResolver::new(registry, self.config.resolver_config()),
            config: self.config,
            delivery,
        })
    }
}

impl Default for BridgeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_registry(config: &BridgeConfig) -> ModuleRegistry {
    let fetcher = match Fetcher::new(config.fetch.clone()) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            tracing::warn!(error = %e, "HTTP client unavailable, engine runs offline");
            Fetcher::offline_with(config.fetch.clone())
        }
    };
    let backend = PublicSearchBackend::new(config.search_config(), fetcher.clone());
    ModuleRegistry::with_builtin_engine(config.vendor_dir(), &config.package, backend, fetcher)
}

/// Runs scan requests.
///
/// # Example
///
/// ```rust,ignore
/// use auditor_bridge::bridge::{Bridge, BridgeConfig};
/// use std::path::Path;
///
/// let bridge = Bridge::builder()
///     .with_config(BridgeConfig::new().with_base_dir("/srv/auditor"))
///     .build()?;
///
/// let outcome = bridge.run_guarded(Path::new("request.json"), Path::new("result.json")).await;
/// std::process::exit(outcome.status.code().into());
/// ```
#[derive(Debug)]
pub struct Bridge {
    config: BridgeConfig,
    resolver: EngineResolver,
    delivery: Option<CollectorDelivery>,
}

impl Bridge {
    /// Creates a new builder.
    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::new()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Returns the engine resolver.
    pub fn resolver(&self) -> &EngineResolver {
        &self.resolver
    }

    /// Returns `true` if a collector delivery client is configured.
    pub fn has_delivery(&self) -> bool {
        self.delivery.is_some()
    }

    /// Runs one request read from `input`, writing the result to `output`.
    ///
    /// Panics raised by the engine are not caught here; see
    /// [`Bridge::run_guarded`].
    pub async fn run(&self, input: &Path, output: &Path) -> RunOutcome {
        let mut log = RunLog::new();
        self.run_logged(input, output, &mut log).await
    }

    /// Like [`Bridge::run`], but converts a panic into the fatal outcome.
    ///
    /// The fatal result keeps every run-log line written before the fault.
    pub async fn run_guarded(&self, input: &Path, output: &Path) -> RunOutcome {
        let mut log = RunLog::new();
        let caught = AssertUnwindSafe(self.run_logged(input, output, &mut log))
            .catch_unwind()
            .await;

        match caught {
            Ok(outcome) => outcome,
            Err(payload) => {
                let fault = panic_message(payload.as_ref());
                tracing::error!(fault = %fault, lines = log.len(), "Bridge crashed");
                RunOutcome::new(ScanResult::fatal(log, &fault), ExitStatus::Fatal)
            }
        }
    }

    async fn run_logged(&self, input: &Path, output: &Path, log: &mut RunLog) -> RunOutcome {
        let run_id = Uuid::new_v4().to_string();
        let start = Instant::now();
        audit::emit_run_started(&run_id, input, output, &self.config.base_dir);

        log.push(format!(
            "auditor-bridge start: {}",
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
        ));
        log.push(format!("Base dir: {}", self.config.base_dir.display()));

        let outcome = match ScanRequest::load(input).await {
            Ok(request) => self.process(&run_id, &request, log, output).await,
            Err(e) => {
                log.push(format!("Failed to read input JSON: {}", e));
                tracing::warn!(input = %input.display(), error = %e, "Request could not be read");

                let result = ScanResult::input_failure(log.clone());
                if let Err(e) = self.persist_output(&result, output).await {
                    tracing::error!(error = %e, "Input error result could not be written");
                }
                RunOutcome::new(result, ExitStatus::InputError)
            }
        };

        audit::emit_run_completed(&RunAuditEvent::from_outcome(&run_id, &outcome, start.elapsed()));
        outcome
    }

    async fn process(
        &self,
        run_id: &str,
        request: &ScanRequest,
        log: &mut RunLog,
        output: &Path,
    ) -> RunOutcome {
        log.push(request.describe());

        let vendor_present = self.resolver.vendor_present();
        log.push(format!("Engine vendor present: {}", vendor_present));

        let run = self
            .resolver
            .resolve_and_run(request.query.as_deref(), request.use_anonymizing_proxy, log)
            .await;
        audit::emit_engine_completed(run_id, vendor_present, &run.summary, run.findings.len());

        let findings = run.findings;
        let summary = finalize_summary(run.summary, findings.len());

        match write_report(&self.config.reports_dir(), &summary, &findings, log.lines()).await {
            Ok(path) => log.push(format!("Report saved: {}", path.display())),
            Err(e) => {
                tracing::warn!(error = %e, "Report not saved");
                log.push(format!("Report not saved: {}", e));
            }
        }

        if let Some(url) = &request.collector_url {
            let snapshot = ScanResult::new(summary.clone(), findings.clone(), log.clone());
            self.deliver(run_id, url, request.collector_secret.as_ref(), &snapshot, log)
                .await;
        }

        if request.email_to.is_some() {
            log.push("Email delivery requested but not implemented; skipping.");
        }

        let result = ScanResult::new(summary, findings, log.clone());
        let status = match self.persist_output(&result, output).await {
            Ok(()) => ExitStatus::Success,
            Err(_) => ExitStatus::OutputError,
        };

        tracing::info!(
            status = %status,
            findings = result.findings.len(),
            summary = %result.summary,
            "Run finished"
        );
        RunOutcome::new(result, status)
    }

    async fn deliver(
        &self,
        run_id: &str,
        url: &str,
        secret: Option<&SecretString>,
        snapshot: &ScanResult,
        log: &mut RunLog,
    ) {
        let Some(delivery) = &self.delivery else {
            log.push("No HTTP client available; skipping collector POST.");
            audit::emit_delivery(&DeliveryAuditEvent::new(
                run_id,
                url,
                false,
                DeliveryOutcome::Skipped,
            ));
            return;
        };

        let event = match delivery.post(url, secret, snapshot).await {
            Ok(status) => {
                log.push(format!("Collector POST -> {} [status={}]", url, status));
                DeliveryAuditEvent::new(run_id, url, secret.is_some(), DeliveryOutcome::Delivered)
                    .with_status(status)
            }
            Err(e) => {
                log.push(format!("Collector POST failed: {} [{}]", e, e.kind()));
                tracing::warn!(error = %e, error_kind = e.kind(), "Collector POST failed");
                DeliveryAuditEvent::new(run_id, url, secret.is_some(), DeliveryOutcome::Failed)
                    .with_error_kind(e.kind())
            }
        };
        audit::emit_delivery(&event);
    }

    /// Writes the result JSON to `output`.
    ///
    /// On failure an emergency copy is written under the logs directory and
    /// the original error is returned.
    async fn persist_output(&self, result: &ScanResult, output: &Path) -> BridgeResult<()> {
        let json = result.to_json_pretty()?;

        let source = match tokio::fs::write(output, &json).await {
            Ok(()) => return Ok(()),
            Err(source) => source,
        };
        let err = BridgeError::Output {
            path: output.to_path_buf(),
            source,
        };

        match self.write_emergency(&json).await {
            Ok(path) => tracing::error!(
                error = %err,
                emergency = %path.display(),
                "Output not written, emergency copy saved"
            ),
            Err(e) => tracing::error!(
                error = %err,
                emergency_error = %e,
                "Output not written, emergency copy failed too"
            ),
        }
        Err(err)
    }

    async fn write_emergency(&self, json: &str) -> std::io::Result<PathBuf> {
        let dir = self.config.logs_dir();
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(format!("runner_emergency_{}.json", Uuid::new_v4().simple()));
        tokio::fs::write(&path, json).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MockBackend;
    use crate::core::Finding;
    use crate::engine::{Module, VENDOR_NOT_FOUND};
    use serde_json::json;

    struct Workspace {
        dir: tempfile::TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn base(&self) -> &Path {
            self.dir.path()
        }

        fn request(&self, body: &str) -> PathBuf {
            let path = self.base().join("request.json");
            std::fs::write(&path, body).unwrap();
            path
        }

        fn output(&self) -> PathBuf {
            self.base().join("result.json")
        }

        fn vendor_with(&self, backend: MockBackend) -> ModuleRegistry {
            let vendor = self.base().join("vendor").join("engine");
            std::fs::create_dir_all(&vendor).unwrap();
            ModuleRegistry::new(&vendor).with_module(Module::new("engine.search", &vendor).with_search(backend))
        }

        fn config(&self) -> BridgeConfig {
            BridgeConfig::new().with_base_dir(self.base())
        }

        fn files_in(&self, sub: &str) -> Vec<PathBuf> {
            match std::fs::read_dir(self.base().join(sub)) {
                Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
                Err(_) => Vec::new(),
            }
        }

        fn written_result(&self) -> ScanResult {
            serde_json::from_str(&std::fs::read_to_string(self.output()).unwrap()).unwrap()
        }
    }

    #[tokio::test]
    async fn test_vendor_absent_is_success_with_report() {
        let ws = Workspace::new();
        let bridge = Bridge::builder().with_config(ws.config()).build().unwrap();

        let outcome = bridge
            .run(&ws.request(r#"{"query":"tokens"}"#), &ws.output())
            .await;

        assert_eq!(outcome.status, ExitStatus::Success);
        assert_eq!(outcome.result.summary, VENDOR_NOT_FOUND);
        assert!(outcome.result.findings.is_empty());
        assert_eq!(ws.written_result(), outcome.result);

        let reports = ws.files_in("reports");
        assert_eq!(reports.len(), 1);
        let name = reports[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("auditor_report_") && name.ends_with(".txt"));

        let lines = &outcome.result.log_lines;
        assert!(lines[0].starts_with("auditor-bridge start: "));
        assert!(lines.iter().any(|l| l == "Engine vendor present: false"));
        assert!(lines.iter().any(|l| l.starts_with("Report saved: ")));
    }

    #[tokio::test]
    async fn test_engine_findings_flow_into_report_and_output() {
        let ws = Workspace::new();
        let backend = MockBackend::new().with_items(vec![
            json!({"title": "Leaked token", "url": "https://paste.example/1"}),
            json!({"type": "topic", "detail": "Invoices"}),
        ]);
        let bridge = Bridge::builder()
            .with_config(ws.config())
            .with_registry(ws.vendor_with(backend))
            .without_delivery()
            .build()
            .unwrap();

        let outcome = bridge
            .run(&ws.request(r#"{"query":"tokens","use_tor":true}"#), &ws.output())
            .await;

        assert_eq!(outcome.status, ExitStatus::Success);
        assert_eq!(outcome.result.summary, "Engine search completed. Collected 2 result(s).");
        assert_eq!(outcome.result.findings[1], Finding::new("topic", "Invoices", "N/A"));

        let report = std::fs::read_to_string(&ws.files_in("reports")[0]).unwrap();
        assert!(report.contains("001. [result] Leaked token   @ https://paste.example/1"));
        assert!(report.contains("002. [topic] Invoices   @ N/A"));
    }

    #[tokio::test]
    async fn test_malformed_request_is_input_error() {
        let ws = Workspace::new();
        let bridge = Bridge::builder().with_config(ws.config()).build().unwrap();

        let outcome = bridge.run(&ws.request("{ not json"), &ws.output()).await;

        assert_eq!(outcome.status, ExitStatus::InputError);
        assert_eq!(outcome.result.summary, "Input error: request could not be read.");
        assert!(outcome.result.findings.is_empty());
        assert!(outcome
            .result
            .log_lines
            .iter()
            .any(|l| l.starts_with("Failed to read input JSON")));
        assert_eq!(ws.written_result(), outcome.result);
        assert!(ws.files_in("reports").is_empty());
    }

    #[tokio::test]
    async fn test_missing_request_file_is_input_error() {
        let ws = Workspace::new();
        let bridge = Bridge::builder().with_config(ws.config()).build().unwrap();

        let outcome = bridge.run(&ws.base().join("absent.json"), &ws.output()).await;
        assert_eq!(outcome.status, ExitStatus::InputError);
    }

    #[tokio::test]
    async fn test_unwritable_output_leaves_emergency_copy() {
        let ws = Workspace::new();
        let bridge = Bridge::builder().with_config(ws.config()).build().unwrap();
        let output = ws.base().join("missing").join("result.json");

        let outcome = bridge.run(&ws.request(r#"{"query":"x"}"#), &output).await;

        assert_eq!(outcome.status, ExitStatus::OutputError);
        let emergency = ws.files_in("logs");
        assert_eq!(emergency.len(), 1);
        let name = emergency[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("runner_emergency_") && name.ends_with(".json"));

        let saved: ScanResult =
            serde_json::from_str(&std::fs::read_to_string(&emergency[0]).unwrap()).unwrap();
        assert_eq!(saved, outcome.result);
    }

    #[tokio::test]
    async fn test_blank_collector_is_not_contacted() {
        let ws = Workspace::new();
        let bridge = Bridge::builder().with_config(ws.config()).build().unwrap();

        let outcome = bridge
            .run(&ws.request(r#"{"query":"","webhook_url":""}"#), &ws.output())
            .await;

        assert_eq!(outcome.status, ExitStatus::Success);
        assert!(outcome.result.findings.is_empty());
        assert_eq!(outcome.result.summary, VENDOR_NOT_FOUND);
        assert_eq!(ws.files_in("reports").len(), 1);
        assert!(!outcome.result.log_lines.iter().any(|l| l.contains("Collector POST")));
    }

    #[tokio::test]
    async fn test_without_delivery_skips_collector() {
        let ws = Workspace::new();
        let bridge = Bridge::builder()
            .with_config(ws.config())
            .without_delivery()
            .build()
            .unwrap();
        assert!(!bridge.has_delivery());

        let outcome = bridge
            .run(
                &ws.request(r#"{"webhook_url":"http://collector.invalid/hook","email_to":"a@b.c"}"#),
                &ws.output(),
            )
            .await;

        let lines = &outcome.result.log_lines;
        assert!(lines.iter().any(|l| l.contains("skipping collector POST")));
        assert!(lines.iter().any(|l| l.contains("Email delivery requested but not implemented")));
        assert_eq!(outcome.status, ExitStatus::Success);
    }

    #[tokio::test]
    async fn test_panicking_engine_is_fatal() {
        let ws = Workspace::new();
        let bridge = Bridge::builder()
            .with_config(ws.config())
            .with_registry(ws.vendor_with(MockBackend::panicking("engine exploded")))
            .build()
            .unwrap();

        let outcome = bridge
            .run_guarded(&ws.request(r#"{"query":"x"}"#), &ws.output())
            .await;

        assert_eq!(outcome.status, ExitStatus::Fatal);
        assert_eq!(outcome.result.summary, "Bridge crashed: engine exploded");
        assert!(outcome.result.findings.is_empty());

        let lines = &outcome.result.log_lines;
        assert!(lines[0].starts_with("auditor-bridge start: "));
        assert!(lines.iter().any(|l| l.starts_with("Request: ")));
        assert!(lines.iter().any(|l| l.starts_with("Engine module OK: engine.search")));
        assert!(lines.iter().any(|l| l.starts_with("Calling engine search()")));
        assert_eq!(lines.last().map(String::as_str), Some("engine exploded"));
    }

    #[test]
    fn test_invalid_config_fails_build() {
        let err = Bridge::builder()
            .with_config(BridgeConfig::new().with_package(""))
            .build()
            .unwrap_err();
        assert!(matches!(err, BridgeError::Configuration { .. }));
    }

    #[test]
    fn test_finalize_summary() {
        assert_eq!(finalize_summary("kept".to_string(), 3), "kept");
        let synthesized = finalize_summary(String::new(), 3);
        assert!(synthesized.starts_with("Scan complete at "));
        assert!(synthesized.ends_with(" with 3 finding(s)."));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[cfg(feature = "http")]
    mod collector {
        use super::*;
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        #[tokio::test]
        async fn test_result_is_posted_with_secret() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/hook"))
                .and(header("x-auditor-secret", "hunter2"))
                .respond_with(ResponseTemplate::new(200))
                .expect(1)
                .mount(&server)
                .await;

            let ws = Workspace::new();
            let bridge = Bridge::builder().with_config(ws.config()).build().unwrap();
            let request = json!({
                "query": "x",
                "webhook_url": format!("{}/hook", server.uri()),
                "webhook_secret": "hunter2"
            });

            let outcome = bridge.run(&ws.request(&request.to_string()), &ws.output()).await;

            assert_eq!(outcome.status, ExitStatus::Success);
            let lines = &ws.written_result().log_lines;
            assert!(lines.iter().any(|l| l.contains("[status=200]")));
            assert!(!lines.iter().any(|l| l.contains("hunter2")));
        }

        #[tokio::test]
        async fn test_collector_connection_error_is_soft() {
            let ws = Workspace::new();
            let bridge = Bridge::builder().with_config(ws.config()).build().unwrap();

            let outcome = bridge
                .run(&ws.request(r#"{"query":"x","webhook_url":"http://127.0.0.1:1/hook"}"#), &ws.output())
                .await;

            assert_eq!(outcome.status, ExitStatus::Success);
            assert_eq!(ws.files_in("reports").len(), 1);
            assert!(ws
                .written_result()
                .log_lines
                .iter()
                .any(|l| l.starts_with("Collector POST failed")));
        }
    }
}
