//! Core types used throughout the auditor bridge.
//!
//! This module defines the normalized `Finding` schema and the `ScanRequest`
//! read from the caller.

use crate::core::error::{BridgeError, BridgeResult};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Well-known finding kinds.
///
/// The kind is a free-form tag; these are the ones the bridge itself emits.
pub mod kind {
    /// A single direct answer from the provider.
    pub const ABSTRACT: &str = "abstract";
    /// One related-topic entry from the provider.
    pub const TOPIC: &str = "topic";
    /// A status message rather than a result (passive or degraded mode).
    pub const NOTICE: &str = "notice";
    /// A successful fetch that yielded nothing extractable.
    pub const EXAMPLE: &str = "example";
    /// Default kind for backend items that carry no `type`.
    pub const RESULT: &str = "result";
}

/// One normalized unit of scan output.
///
/// Findings keep insertion order; that order is the display order in the
/// text report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Short free-form tag such as `"topic"` or `"notice"`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Human-readable text. May be empty, never absent.
    pub detail: String,

    /// A URL, or [`Finding::NO_LOCATION`] when there is no locator.
    pub location: String,
}

impl Finding {
    /// Sentinel location for findings without a locator.
    pub const NO_LOCATION: &'static str = "N/A";

    /// Creates a new finding.
    pub fn new(
        kind: impl Into<String>,
        detail: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            detail: detail.into(),
            location: location.into(),
        }
    }

    /// Creates a `notice` finding with no locator.
    pub fn notice(detail: impl Into<String>) -> Self {
        Self::new(kind::NOTICE, detail, Self::NO_LOCATION)
    }

    /// Returns `true` if the finding has a real locator.
    pub fn has_location(&self) -> bool {
        !self.location.is_empty() && self.location != Self::NO_LOCATION
    }

    /// Converts the finding into the raw item shape backends return.
    pub fn into_raw(self) -> serde_json::Value {
        serde_json::json!({
            "type": self.kind,
            "detail": self.detail,
            "location": self.location,
        })
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}   @ {}", self.kind, self.detail, self.location)
    }
}

/// Request document as written by the caller.
///
/// Accepts both the historical key names (`use_tor`, `webhook_*`) and the
/// descriptive ones; when both spellings are present the descriptive one
/// wins.
#[derive(Debug, Default, Deserialize)]
struct RawScanRequest {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    use_tor: Option<bool>,
    #[serde(default)]
    use_anonymizing_proxy: Option<bool>,
    #[serde(default)]
    webhook_url: Option<String>,
    #[serde(default)]
    collector_url: Option<String>,
    #[serde(default)]
    webhook_secret: Option<String>,
    #[serde(default)]
    collector_secret: Option<String>,
    #[serde(default)]
    email_to: Option<String>,
    #[serde(default)]
    email_subject: Option<String>,
    #[serde(default)]
    attach_report: Option<bool>,
}

/// A structured scan request.
///
/// Blank strings are normalized to `None`. The collector secret is only
/// ever exposed to the delivery client; `Debug` output redacts it.
#[derive(Debug, Default)]
pub struct ScanRequest {
    /// Search query. `None` means passive mode.
    pub query: Option<String>,

    /// Route backend traffic through the anonymizing proxy.
    pub use_anonymizing_proxy: bool,

    /// Remote collector that receives a copy of the result.
    pub collector_url: Option<String>,

    /// Opaque token sent to the collector in a custom header.
    pub collector_secret: Option<SecretString>,

    /// Caller-only: destination address. Not interpreted.
    pub email_to: Option<String>,

    /// Caller-only: mail subject. Not interpreted.
    pub email_subject: Option<String>,

    /// Caller-only: attach-report flag. Not interpreted.
    pub attach_report: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<RawScanRequest> for ScanRequest {
    fn from(raw: RawScanRequest) -> Self {
        Self {
            query: non_blank(raw.query),
            use_anonymizing_proxy: raw.use_anonymizing_proxy.or(raw.use_tor).unwrap_or(false),
            collector_url: non_blank(raw.collector_url).or_else(|| non_blank(raw.webhook_url)),
            collector_secret: non_blank(raw.collector_secret)
                .or_else(|| non_blank(raw.webhook_secret))
                .map(|s| SecretString::new(s.into_boxed_str())),
            email_to: non_blank(raw.email_to),
            email_subject: non_blank(raw.email_subject),
            attach_report: raw.attach_report.unwrap_or(false),
        }
    }
}

impl ScanRequest {
    /// Creates an empty (passive) request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the query.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = non_blank(Some(query.into()));
        self
    }

    /// Enables or disables proxy routing.
    pub fn with_proxy(mut self, enabled: bool) -> Self {
        self.use_anonymizing_proxy = enabled;
        self
    }

    /// Sets the collector URL.
    pub fn with_collector(mut self, url: impl Into<String>) -> Self {
        self.collector_url = non_blank(Some(url.into()));
        self
    }

    /// Sets the collector secret.
    pub fn with_collector_secret(mut self, secret: impl Into<String>) -> Self {
        self.collector_secret =
            non_blank(Some(secret.into())).map(|s| SecretString::new(s.into_boxed_str()));
        self
    }

    /// Parses a request from JSON text.
    ///
    /// The document must be a JSON object; any other JSON value is an input
    /// error.
    pub fn from_json(text: &str) -> BridgeResult<Self> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| BridgeError::input(format!("malformed request JSON: {}", e)))?;

        if !value.is_object() {
            return Err(BridgeError::input(format!(
                "request must be a JSON object, found {}",
                json_type(&value)
            )));
        }

        let raw: RawScanRequest = serde_json::from_value(value)
            .map_err(|e| BridgeError::input(format!("malformed request JSON: {}", e)))?;
        Ok(raw.into())
    }

    /// Reads and parses a request file.
    pub async fn load(path: &Path) -> BridgeResult<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            BridgeError::input(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    /// Returns `true` if the request carries no query.
    pub fn is_passive(&self) -> bool {
        self.query.is_none()
    }

    /// One-line description of the request shape for the run log.
    ///
    /// The secret is reported by presence only.
    pub fn describe(&self) -> String {
        let query = match &self.query {
            Some(q) => format!("{:?}", q),
            None => "<empty>".to_string(),
        };
        format!(
            "Request: query={}, use_proxy={}, collector={}, secret={}, email={}, attach={}",
            query,
            self.use_anonymizing_proxy,
            yes_no(self.collector_url.is_some()),
            yes_no(self.collector_secret.is_some()),
            yes_no(self.email_to.is_some()),
            self.attach_report,
        )
    }
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
