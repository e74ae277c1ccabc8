//! Default search backend.
//!
//! Queries a public instant-answer JSON API (DuckDuckGo-compatible) through
//! the fetch layer and maps its response into findings.
//!
//! # Modes
//!
//! 1. Empty query: one passive-mode notice, no network.
//! 2. Live network disabled (the default): one offline notice, no network.
//! 3. Live: fetch the provider and extract an abstract, up to
//!    `max_topics` related topics, or an "example" marker. Any fetch
//!    failure degrades to a notice; `search` never returns an error.

use crate::core::{kind, Backend, BackendError, Finding};
use crate::fetch::{FetchOutcome, FetchRequest, Fetcher};

use async_trait::async_trait;
use serde_json::Value;
use std::time::Instant;

/// Default provider endpoint.
pub const DEFAULT_PROVIDER_URL: &str = "https://api.duckduckgo.com/";

/// Maximum number of related topics kept from one response.
pub const MAX_TOPICS: usize = 5;

/// Detail of the finding returned in passive mode.
pub const PASSIVE_NOTICE: &str = "No query provided — engine ran in passive mode.";

/// Configuration for [`PublicSearchBackend`].
#[derive(Debug, Clone)]
pub struct PublicSearchConfig {
    /// Provider endpoint; query parameters are appended.
    pub base_url: String,

    /// Whether live network calls are allowed. Off by default.
    pub live: bool,

    /// Cap on related-topic findings.
    pub max_topics: usize,
}

impl Default for PublicSearchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_URL.to_string(),
            live: false,
            max_topics: MAX_TOPICS,
        }
    }
}

impl PublicSearchConfig {
    /// Creates a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the provider endpoint.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Enables or disables live network calls.
    pub fn with_live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    /// Sets the related-topic cap.
    pub fn with_max_topics(mut self, max: usize) -> Self {
        self.max_topics = max;
        self
    }
}

/// The shipped search backend.
///
/// # Example
///
/// ```rust
/// use auditor_bridge::backends::public_search::{PublicSearchBackend, PublicSearchConfig};
/// use auditor_bridge::fetch::Fetcher;
///
/// let backend = PublicSearchBackend::new(PublicSearchConfig::default(), Fetcher::offline());
/// assert!(!backend.config().live);
/// ```
#[derive(Debug, Clone)]
pub struct PublicSearchBackend {
    config: PublicSearchConfig,
    fetcher: Fetcher,
}

impl PublicSearchBackend {
    /// Creates a new backend.
    pub fn new(config: PublicSearchConfig, fetcher: Fetcher) -> Self {
        Self { config, fetcher }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PublicSearchConfig {
        &self.config
    }

    /// Builds the provider URL for `query`.
    pub fn provider_url(&self, query: &str) -> Result<String, url::ParseError> {
        let url = url::Url::parse_with_params(
            &self.config.base_url,
            &[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("no_redirect", "1"),
                ("skip_disambig", "1"),
            ],
        )?;
        Ok(url.into())
    }

    /// Runs the search and returns typed findings.
    pub async fn search_findings(&self, query: &str, use_proxy: bool) -> Vec<Finding> {
        let start = Instant::now();

        let (mode, findings) = if query.is_empty() {
            ("offline", vec![Finding::notice(PASSIVE_NOTICE)])
        } else if !self.config.live {
            (
                "offline",
                vec![Finding::notice(format!(
                    "Live network disabled; offline stub result for '{}'.",
                    query
                ))],
            )
        } else {
            self.search_live(query, use_proxy).await
        };

        tracing::info!(
            engine = self.name(),
            network_mode = mode,
            count = findings.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Search finished"
        );

        findings
    }

    async fn search_live(&self, query: &str, use_proxy: bool) -> (&'static str, Vec<Finding>) {
        let url = match self.provider_url(query) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(base_url = %self.config.base_url, error = %e, "Invalid provider URL");
                return (
                    "offline",
                    vec![Finding::notice(format!(
                        "Provider URL '{}' is invalid ({}); offline stub result for '{}'.",
                        self.config.base_url, e, query
                    ))],
                );
            }
        };

        let outcome = self
            .fetcher
            .fetch(&FetchRequest::get(url).with_proxy(use_proxy))
            .await;

        if !outcome.is_live_success() {
            return ("offline", vec![degraded_notice(&outcome, query)]);
        }

        let parsed = outcome
            .parsed_json
            .as_ref()
            .map(|data| parse_instant_answer(data, self.config.max_topics))
            .unwrap_or_default();

        if parsed.is_empty() {
            let location = if outcome.resolved_url.is_empty() {
                Finding::NO_LOCATION.to_string()
            } else {
                outcome.resolved_url.clone()
            };
            return (
                "live",
                vec![Finding::new(
                    kind::EXAMPLE,
                    format!("Fetched live data for '{}'", query),
                    location,
                )],
            );
        }

        ("live", parsed)
    }
}

fn degraded_notice(outcome: &FetchOutcome, query: &str) -> Finding {
    let reason = outcome.error.as_deref().unwrap_or("unknown error");
    Finding::notice(format!(
        "Live fetch unavailable ({}: {}); offline stub result for '{}'.",
        outcome.mode, reason, query
    ))
}

/// Maps an instant-answer payload to findings.
///
/// A non-empty `AbstractText` wins and yields a single `abstract` finding.
/// Otherwise `RelatedTopics` entries become `topic` findings in source
/// order, with one level of `Topics` groups flattened in place, keeping the
/// first `max_topics`. Returns an empty list when neither shape is present.
pub fn parse_instant_answer(data: &Value, max_topics: usize) -> Vec<Finding> {
    let Some(object) = data.as_object() else {
        return Vec::new();
    };

    if let Some(text) = non_empty_str(object.get("AbstractText")) {
        let location = non_empty_str(object.get("AbstractURL")).unwrap_or(Finding::NO_LOCATION);
        return vec![Finding::new(kind::ABSTRACT, text, location)];
    }

    let Some(topics) = object.get("RelatedTopics").and_then(Value::as_array) else {
        return Vec::new();
    };

    topics
        .iter()
        .flat_map(flatten_topic)
        .take(max_topics)
        .map(topic_finding)
        .collect()
}

fn flatten_topic(item: &Value) -> Vec<&Value> {
    if item.get("Text").is_some() || item.get("FirstURL").is_some() {
        return vec![item];
    }
    match item.get("Topics").and_then(Value::as_array) {
        Some(group) => group.iter().collect(),
        None => Vec::new(),
    }
}

fn topic_finding(item: &Value) -> Finding {
    let text = non_empty_str(item.get("Text")).unwrap_or("(no text)");
    let url = non_empty_str(item.get("FirstURL")).unwrap_or(Finding::NO_LOCATION);
    Finding::new(kind::TOPIC, text, url)
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

#[async_trait]
impl Backend for PublicSearchBackend {
    fn name(&self) -> &str {
        "public-search"
    }

    async fn search(&self, query: &str, use_proxy: bool) -> Result<Vec<Value>, BackendError> {
        Ok(self
            .search_findings(query, use_proxy)
            .await
            .into_iter()
            .map(Finding::into_raw)
            .collect())
    }
}
