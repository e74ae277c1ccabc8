//! Bridge configuration.

use crate::backends::public_search::{PublicSearchConfig, DEFAULT_PROVIDER_URL};
use crate::core::{BridgeError, BridgeResult};
use crate::engine::{ResolverConfig, DEFAULT_QUERY, MAX_FINDINGS};
use crate::fetch::FetchConfig;

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that enables live network calls.
pub const LIVE_ENV_VAR: &str = "AUDITOR_LIVE";

/// Default package name of the engine inside the vendor tree.
pub const DEFAULT_PACKAGE: &str = "engine";

/// Default timeout for the collector POST.
pub const DEFAULT_COLLECTOR_TIMEOUT: Duration = Duration::from_secs(15);

/// Interprets the live-network toggle.
///
/// `1`, `true`, `on` and `yes` (any case, surrounding whitespace ignored)
/// enable it; anything else, or no value, leaves it off.
pub fn parse_live_flag(value: Option<&str>) -> bool {
    value
        .map(|v| v.trim().to_ascii_lowercase())
        .is_some_and(|v| matches!(v.as_str(), "1" | "true" | "on" | "yes"))
}

/// Configuration for a [`Bridge`](crate::bridge::Bridge).
///
/// Directory layout under `base_dir`:
///
/// ```text
/// <base_dir>/reports/        text reports
/// <base_dir>/logs/           emergency copies of the output
/// <base_dir>/vendor/engine/  engine vendor tree (overridable)
/// ```
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Root for reports, logs and the default vendor tree.
    pub base_dir: PathBuf,

    /// Vendor tree location. Defaults to `<base_dir>/vendor/<package>`.
    pub vendor_dir: Option<PathBuf>,

    /// Engine package name used by the package lookup strategy.
    pub package: String,

    /// Allow the default backend to make live network calls.
    pub live_network: bool,

    /// Fetch layer configuration.
    pub fetch: FetchConfig,

    /// Endpoint of the public search provider.
    pub provider_url: String,

    /// Timeout for the collector POST.
    pub collector_timeout: Duration,

    /// Query used when the request has none.
    pub default_query: String,

    /// Maximum number of findings kept.
    pub max_findings: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            vendor_dir: None,
            package: DEFAULT_PACKAGE.to_string(),
            live_network: false,
            fetch: FetchConfig::default(),
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            collector_timeout: DEFAULT_COLLECTOR_TIMEOUT,
            default_query: DEFAULT_QUERY.to_string(),
            max_findings: MAX_FINDINGS,
        }
    }
}

impl BridgeConfig {
    /// Creates a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base directory.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Sets the vendor directory.
    pub fn with_vendor_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.vendor_dir = Some(dir.into());
        self
    }

    /// Sets the engine package name.
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    /// Enables or disables live network calls.
    pub fn with_live_network(mut self, live: bool) -> Self {
        self.live_network = live;
        self
    }

    /// Sets the fetch configuration.
    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Sets the search provider endpoint.
    pub fn with_provider_url(mut self, url: impl Into<String>) -> Self {
        self.provider_url = url.into();
        self
    }

    /// Sets the collector timeout.
    pub fn with_collector_timeout(mut self, timeout: Duration) -> Self {
        self.collector_timeout = timeout;
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

    /// Returns the reports directory.
    pub fn reports_dir(&self) -> PathBuf {
        self.base_dir.join("reports")
    }

    /// Returns the directory for emergency output copies.
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Returns the effective vendor directory.
    pub fn vendor_dir(&self) -> PathBuf {
        self.vendor_dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join("vendor").join(&self.package))
    }

    /// Resolver settings derived from this configuration.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::new()
            .with_package(&self.package)
            .with_default_query(self.default_query.clone())
            .with_max_findings(self.max_findings)
    }

    /// Default backend settings derived from this configuration.
    pub fn search_config(&self) -> PublicSearchConfig {
        PublicSearchConfig::new()
            .with_base_url(self.provider_url.clone())
            .with_live(self.live_network)
    }

    /// Checks the configuration for values the bridge cannot run with.
    pub fn validate(&self) -> BridgeResult<()> {
        if self.base_dir.as_os_str().is_empty() {
            return Err(BridgeError::configuration("base directory must not be empty"));
        }
        if self.package.is_empty() || self.package.contains('.') {
            return Err(BridgeError::configuration(format!(
                "invalid engine package name '{}'",
                self.package
            )));
        }
        if self.default_query.trim().is_empty() {
            return Err(BridgeError::configuration("default query must not be empty"));
        }
        if self.max_findings == 0 {
            return Err(BridgeError::configuration("max_findings must be at least 1"));
        }
        if self.collector_timeout.is_zero() || self.fetch.timeout.is_zero() {
            return Err(BridgeError::configuration("timeouts must be non-zero"));
        }
        Ok(())
    }
}
