//! Engine resolution and invocation.
//!
//! The resolver locates the engine's `search` module with an ordered list of
//! [`LookupStrategy`]s, verifies the entry point, invokes it and normalizes
//! what comes back. Every failure is turned into run-log lines and a
//! degraded summary; [`EngineResolver::resolve_and_run`] itself never fails.

use crate::core::{ArcBackend, Finding, ResolveError, RunLog};
use crate::engine::normalize::{normalize_items, MAX_FINDINGS};
use crate::engine::registry::{Export, Module, ModuleRegistry};
use crate::engine::strategy::{default_strategies, LookupStrategy};

use std::time::Instant;

/// Query used when the caller supplied none.
pub const DEFAULT_QUERY: &str = "suspicious credentials OR tokens OR invoices OR passwords";

/// Summary when the vendor directory is missing.
pub const VENDOR_NOT_FOUND: &str = "Engine vendor not found. Performed a local stub scan.";

/// Summary when no usable `search` entry point was found.
pub const ENTRY_POINT_UNAVAILABLE: &str =
    "Engine search entry point not available; skipping engine search.";

/// Summary when the engine failed while running.
pub const ENGINE_UNAVAILABLE: &str = "Engine unavailable: search failed; no findings collected.";

const SEARCH_MODULE: &str = "search";
const SCRAPE_MODULE: &str = "scrape";
const ENTRY_POINT: &str = "search";

/// Configuration for the engine resolver.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Lookup strategies, in priority order.
    pub strategies: Vec<LookupStrategy>,

    /// Query used when the caller supplied none.
    pub default_query: String,

    /// Maximum number of findings kept.
    pub max_findings: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies("engine"),
            default_query: DEFAULT_QUERY.to_string(),
            max_findings: MAX_FINDINGS,
        }
    }
}

impl ResolverConfig {
    /// Creates a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the default strategies with `package` as the package name.
    pub fn with_package(mut self, package: &str) -> Self {
        self.strategies = default_strategies(package);
        self
    }

    /// Sets the lookup strategies.
    pub fn with_strategies(mut self, strategies: Vec<LookupStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Sets the fallback query.
    pub fn with_default_query(mut self, query: impl Into<String>) -> Self {
        self.default_query = query.into();
        self
    }

    /// Sets the findings cap.
    pub fn with_max_findings(mut self, max: usize) -> Self {
        self.max_findings = max;
        self
    }
}

/// Result of one resolver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRun {
    /// One-line summary.
    pub summary: String,

    /// Normalized findings, at most `max_findings`.
    pub findings: Vec<Finding>,
}

impl EngineRun {
    fn degraded(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            findings: Vec::new(),
        }
    }
}

/// Locates and runs the search engine.
#[derive(Debug, Clone)]
pub struct EngineResolver {
    registry: ModuleRegistry,
    config: ResolverConfig,
}

impl EngineResolver {
    /// Creates a new resolver.
    pub fn new(registry: ModuleRegistry, config: ResolverConfig) -> Self {
        Self { registry, config }
    }

    /// Returns the module registry.
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Returns `true` if the vendor directory exists.
    pub fn vendor_present(&self) -> bool {
        self.registry.is_present()
    }

    /// Resolves `symbol` with each strategy in turn, logging failed attempts.
    pub fn resolve_module(&self, symbol: &str, log: &mut RunLog) -> Option<&Module> {
        for strategy in &self.config.strategies {
            let name = strategy.module_name(symbol);
            match self.registry.get(&name) {
                Ok(module) => {
                    tracing::debug!(module = %name, strategy = %strategy, "Engine module resolved");
                    return Some(module);
                }
                Err(e) => {
                    log.push(format!("{} lookup '{}' failed: {}", strategy.label(), name, e));
                }
            }
        }
        None
    }

    /// Verifies that `module` exports an invocable `search` entry point.
    pub fn resolve_entry_point(&self, module: &Module) -> Result<ArcBackend, ResolveError> {
        match module.export(ENTRY_POINT) {
            Some(Export::Search(backend)) => Ok(backend.clone()),
            Some(other) => Err(ResolveError::NotInvocable {
                module: module.name().to_string(),
                symbol: ENTRY_POINT.to_string(),
                found: other.shape(),
            }),
            None => Err(ResolveError::EntryPointMissing {
                module: module.name().to_string(),
                symbol: ENTRY_POINT.to_string(),
            }),
        }
    }

    /// Resolves the engine, runs it and normalizes its output.
    ///
    /// An empty or missing `query` is replaced by the configured default.
    pub async fn resolve_and_run(
        &self,
        query: Option<&str>,
        use_proxy: bool,
        log: &mut RunLog,
    ) -> EngineRun {
        let root = self.registry.root();
        if !self.vendor_present() {
            log.push(format!("Engine vendor not found at {}", root.display()));
            tracing::warn!(vendor = %root.display(), "Engine vendor not found");
            return EngineRun::degraded(VENDOR_NOT_FOUND);
        }
        log.push(format!("Engine vendor: {}", root.display()));

        let search = self.resolve_module(SEARCH_MODULE, log);
        let scrape = self.resolve_module(SCRAPE_MODULE, log);

        match search {
            Some(module) => log.push(format!(
                "Engine module OK: {} @ {}",
                module.name(),
                module.origin().display()
            )),
            None => log.push(format!(
                "Engine module FAILED: no '{}' module available",
                SEARCH_MODULE
            )),
        }
        if let Some(module) = scrape {
            log.push(format!(
                "Engine scrape module: {} @ {}",
                module.name(),
                module.origin().display()
            ));
        }

        let backend = match search.map(|module| self.resolve_entry_point(module)) {
            Some(Ok(backend)) => {
                log.push("Engine entry point OK: search(query, use_proxy) found.");
                backend
            }
            Some(Err(e)) => {
                log.push(format!("Engine entry point unusable: {} [{}]", e, e.kind()));
                tracing::warn!(error = %e, error_kind = e.kind(), "Engine entry point unusable");
                return EngineRun::degraded(ENTRY_POINT_UNAVAILABLE);
            }
            None => {
                tracing::warn!("Engine search module not found");
                return EngineRun::degraded(ENTRY_POINT_UNAVAILABLE);
            }
        };

        let query = match query {
            Some(q) if !q.is_empty() => q,
            _ => self.config.default_query.as_str(),
        };

        match self.invoke(&backend, query, use_proxy, log).await {
            Ok(findings) => EngineRun {
                summary: format!("Engine search completed. Collected {} result(s).", findings.len()),
                findings,
            },
            Err(e) => {
                log.push(format!("Engine search failed: {} [{}]", e, e.kind()));
                tracing::warn!(
                    engine = backend.name(),
                    error = %e,
                    error_kind = e.kind(),
                    "Engine search failed"
                );
                EngineRun::degraded(ENGINE_UNAVAILABLE)
            }
        }
    }

    async fn invoke(
        &self,
        backend: &ArcBackend,
        query: &str,
        use_proxy: bool,
        log: &mut RunLog,
    ) -> Result<Vec<Finding>, ResolveError> {
        log.push(format!("Calling engine search() via '{}'", backend.name()));

        let start = Instant::now();
        let items = backend.search(query, use_proxy).await?;
        let elapsed = start.elapsed();

        log.push(format!(
            "Engine search() returned {} item(s) in {:.2}s",
            items.len(),
            elapsed.as_secs_f64()
        ));
        tracing::info!(
            engine = backend.name(),
            items = items.len(),
            duration_ms = elapsed.as_millis() as u64,
            "Engine search returned"
        );

        Ok(normalize_items(items, self.config.max_findings)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MockBackend;
    use serde_json::json;
    use std::path::Path;
    use std::sync::Arc;

    fn registry_with(dir: &Path, module: Module) -> ModuleRegistry {
        ModuleRegistry::new(dir).with_module(module)
    }

    fn resolver(registry: ModuleRegistry) -> EngineResolver {
        EngineResolver::new(registry, ResolverConfig::default())
    }

    #[tokio::test]
    async fn test_vendor_absent() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("vendor").join("engine");
        let backend = Arc::new(MockBackend::new());
        let registry = ModuleRegistry::new(&missing)
            .with_module(Module::new("search", &missing).with_export("search", Export::Search(backend.clone())));

        let mut log = RunLog::new();
        let run = resolver(registry).resolve_and_run(Some("q"), false, &mut log).await;

        assert_eq!(run.summary, VENDOR_NOT_FOUND);
        assert!(run.findings.is_empty());
        assert_eq!(backend.search_count(), 0);
        assert!(log.contains("vendor not found"));
    }

    #[tokio::test]
    async fn test_package_fallback_after_flat_failure() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MockBackend::new().with_items(vec![json!({"title": "A", "url": "https://a"})]);
        let registry = registry_with(dir.path(), Module::new("engine.search", dir.path()).with_search(backend));

        let mut log = RunLog::new();
        let run = resolver(registry).resolve_and_run(Some("tokens"), false, &mut log).await;

        assert_eq!(run.summary, "Engine search completed. Collected 1 result(s).");
        assert_eq!(run.findings, vec![Finding::new("result", "A", "https://a")]);
        assert!(log.contains("flat lookup 'search' failed"));
        assert!(log.contains("Engine module OK: engine.search"));
        assert!(log.contains("returned 1 item(s)"));
    }

    #[tokio::test]
    async fn test_flat_module_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let flat = Arc::new(MockBackend::new().with_name("flat"));
        let package = Arc::new(MockBackend::new().with_name("package"));
        let registry = ModuleRegistry::new(dir.path())
            .with_module(Module::new("search", dir.path()).with_export("search", Export::Search(flat.clone())))
            .with_module(
                Module::new("engine.search", dir.path()).with_export("search", Export::Search(package.clone())),
            );

        let mut log = RunLog::new();
        resolver(registry).resolve_and_run(Some("q"), true, &mut log).await;

        assert_eq!(flat.search_count(), 1);
        assert_eq!(package.search_count(), 0);
        assert_eq!(flat.last_call(), Some(("q".to_string(), true)));
    }

    #[tokio::test]
    async fn test_default_query_when_none_supplied() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(MockBackend::new());
        let registry = registry_with(
            dir.path(),
            Module::new("search", dir.path()).with_export("search", Export::Search(backend.clone())),
        );

        let mut log = RunLog::new();
        let run = resolver(registry).resolve_and_run(Some(""), false, &mut log).await;

        assert_eq!(run.summary, "Engine search completed. Collected 0 result(s).");
        assert_eq!(backend.last_call().unwrap().0, DEFAULT_QUERY);
    }

    #[tokio::test]
    async fn test_findings_capped_at_fifty() {
        let dir = tempfile::tempdir().unwrap();
        let items = (0..120).map(|i| json!({"detail": format!("item {}", i)})).collect();
        let registry = registry_with(
            dir.path(),
            Module::new("search", dir.path()).with_search(MockBackend::new().with_items(items)),
        );

        let mut log = RunLog::new();
        let run = resolver(registry).resolve_and_run(Some("q"), false, &mut log).await;

        assert_eq!(run.findings.len(), 50);
        assert_eq!(run.findings[0].detail, "item 0");
        assert_eq!(run.summary, "Engine search completed. Collected 50 result(s).");
    }

    #[tokio::test]
    async fn test_entry_point_missing() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(
            dir.path(),
            Module::new("search", dir.path()).with_export("helpers", Export::opaque("function")),
        );

        let mut log = RunLog::new();
        let run = resolver(registry).resolve_and_run(Some("q"), false, &mut log).await;

        assert_eq!(run.summary, ENTRY_POINT_UNAVAILABLE);
        assert!(log.contains("EntryPointMissing"));
    }

    #[tokio::test]
    async fn test_entry_point_not_invocable() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(
            dir.path(),
            Module::new("search", dir.path()).with_export("search", Export::opaque("string")),
        );

        let mut log = RunLog::new();
        let run = resolver(registry).resolve_and_run(Some("q"), false, &mut log).await;

        assert_eq!(run.summary, ENTRY_POINT_UNAVAILABLE);
        assert!(run.findings.is_empty());
        assert!(log.contains("NotInvocable"));
    }

    #[tokio::test]
    async fn test_no_search_module() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = RunLog::new();
        let run = resolver(ModuleRegistry::new(dir.path()))
            .resolve_and_run(Some("q"), false, &mut log)
            .await;

        assert_eq!(run.summary, ENTRY_POINT_UNAVAILABLE);
        assert!(log.contains("package 'engine' lookup 'engine.search' failed"));
        assert!(log.contains("Engine module FAILED"));
    }

    #[tokio::test]
    async fn test_backend_error_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(
            dir.path(),
            Module::new("search", dir.path()).with_search(MockBackend::failing("upstream down")),
        );

        let mut log = RunLog::new();
        let run = resolver(registry).resolve_and_run(Some("q"), false, &mut log).await;

        assert_eq!(run.summary, ENGINE_UNAVAILABLE);
        assert!(run.findings.is_empty());
        assert!(log.contains("upstream down"));
        assert!(log.contains("[Unavailable]"));
    }

    #[tokio::test]
    async fn test_malformed_item_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with(
            dir.path(),
            Module::new("search", dir.path())
                .with_search(MockBackend::new().with_items(vec![json!({"title": "ok"}), json!(["bad"])])),
        );

        let mut log = RunLog::new();
        let run = resolver(registry).resolve_and_run(Some("q"), false, &mut log).await;

        assert_eq!(run.summary, ENGINE_UNAVAILABLE);
        assert!(log.contains("[NormalizeError]"));
    }
}
