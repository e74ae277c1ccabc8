//! The result of a single fetch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error string reported when no network client capability exists.
pub const CLIENT_NOT_AVAILABLE: &str = "client-not-available";

/// How a fetch was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// A real request was attempted.
    Live,
    /// No client was available; nothing was sent.
    Offline,
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// Stable classification of a fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchErrorKind {
    /// No network client capability.
    ClientUnavailable,
    /// The request timed out.
    Timeout,
    /// DNS, TCP or TLS setup failed.
    Connect,
    /// The server answered outside the 2xx range.
    Status,
    /// The request could not be built (bad URL, header or proxy).
    Builder,
    /// The response body could not be read.
    Body,
    /// Any other transport failure.
    Request,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ClientUnavailable => "client-unavailable",
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Status => "status",
            Self::Builder => "builder",
            Self::Body => "body",
            Self::Request => "request",
        };
        write!(f, "{}", name)
    }
}

/// Everything a caller learns from one fetch.
///
/// There is exactly one outcome per call and no partial results; transport
/// failures are reported here instead of being raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchOutcome {
    /// `true` iff the status was 2xx, or the fetch was served offline.
    pub ok: bool,

    /// HTTP status, when a response arrived.
    pub status_code: Option<u16>,

    /// Final URL after redirects, or the requested URL.
    pub resolved_url: String,

    /// Whether a request was actually attempted.
    pub mode: FetchMode,

    /// Parsed JSON body, if the body was JSON.
    pub parsed_json: Option<serde_json::Value>,

    /// Raw body text, when it was not JSON or both were requested.
    pub raw_text: Option<String>,

    /// Response headers in arrival order, when a response arrived.
    pub headers: Option<Vec<(String, String)>>,

    /// Failure message.
    pub error: Option<String>,

    /// Failure classification.
    pub error_kind: Option<FetchErrorKind>,
}

impl FetchOutcome {
    /// Outcome when no network client is available.
    pub fn offline(url: impl Into<String>) -> Self {
        Self {
            ok: true,
            status_code: None,
            resolved_url: url.into(),
            mode: FetchMode::Offline,
            parsed_json: None,
            raw_text: None,
            headers: None,
            error: Some(CLIENT_NOT_AVAILABLE.to_string()),
            error_kind: Some(FetchErrorKind::ClientUnavailable),
        }
    }

    /// Outcome when the request never produced a usable response.
    pub fn transport_failure(
        url: impl Into<String>,
        kind: FetchErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            ok: false,
            status_code: None,
            resolved_url: url.into(),
            mode: FetchMode::Live,
            parsed_json: None,
            raw_text: None,
            headers: None,
            error: Some(message.into()),
            error_kind: Some(kind),
        }
    }

    /// Outcome for a response that arrived.
    ///
    /// The body is parsed as JSON first and kept as text when that fails.
    /// With `return_both`, the text is kept either way.
    pub fn from_response(
        status: u16,
        resolved_url: impl Into<String>,
        body: String,
        return_both: bool,
    ) -> Self {
        let ok = (200..300).contains(&status);
        let (parsed_json, raw_text) = decode_body(body, return_both);

        Self {
            ok,
            status_code: Some(status),
            resolved_url: resolved_url.into(),
            mode: FetchMode::Live,
            parsed_json,
            raw_text,
            headers: None,
            error: (!ok).then(|| format!("http_error_{}", status)),
            error_kind: (!ok).then_some(FetchErrorKind::Status),
        }
    }

    /// Attaches the response headers.
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Returns the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` if a live request succeeded.
    pub fn is_live_success(&self) -> bool {
        self.mode == FetchMode::Live && self.ok
    }
}

fn decode_body(body: String, return_both: bool) -> (Option<serde_json::Value>, Option<String>) {
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => (Some(json), return_both.then_some(body)),
        Err(_) => (None, Some(body)),
    }
}
