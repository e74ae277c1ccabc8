//! Fetch configuration and request description.

use std::time::Duration;

/// Default timeout for a single fetch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Identifying `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "auditor-bridge/",
    env!("CARGO_PKG_VERSION"),
    " (+https://example.local)"
);

/// Local SOCKS endpoint used for anonymized requests.
pub const DEFAULT_PROXY_URL: &str = "socks5h://127.0.0.1:9050";

/// Configuration shared by every fetch made through one `Fetcher`.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Timeout applied when a request does not set its own.
    pub timeout: Duration,

    /// Default `User-Agent` header.
    pub user_agent: String,

    /// Proxy applied to both `http` and `https` when a request asks for it.
    pub proxy_url: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy_url: DEFAULT_PROXY_URL.to_string(),
        }
    }
}

impl FetchConfig {
    /// Creates a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the proxy URL.
    pub fn with_proxy_url(mut self, url: impl Into<String>) -> Self {
        self.proxy_url = url.into();
        self
    }
}

/// A single GET request.
///
/// ```rust
/// use auditor_bridge::fetch::FetchRequest;
/// use std::time::Duration;
///
/// let request = FetchRequest::get("https://api.example.org/?q=rust")
///     .with_timeout(Duration::from_secs(5))
///     .with_header("Accept", "application/json")
///     .with_proxy(false);
/// ```
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Target URL.
    pub url: String,

    /// Per-request timeout. Falls back to [`FetchConfig::timeout`].
    pub timeout: Option<Duration>,

    /// Route through the configured proxy.
    pub use_proxy: bool,

    /// Extra headers; these win over the defaults on conflict.
    pub headers: Vec<(String, String)>,

    /// Populate `raw_text` even when the body parsed as JSON.
    pub return_both: bool,
}

impl FetchRequest {
    /// Creates a GET request for `url`.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: None,
            use_proxy: false,
            headers: Vec::new(),
            return_both: false,
        }
    }

    /// Sets the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enables or disables proxy routing.
    pub fn with_proxy(mut self, use_proxy: bool) -> Self {
        self.use_proxy = use_proxy;
        self
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Requests both the JSON and the raw text representation.
    pub fn with_both(mut self, return_both: bool) -> Self {
        self.return_both = return_both;
        self
    }
}

/// Merges the default `User-Agent` with caller headers.
///
/// Header names compare case-insensitively. A caller header replaces the
/// default (or an earlier caller header) of the same name in place.
pub fn merge_headers(user_agent: &str, extra: &[(String, String)]) -> Vec<(String, String)> {
    let mut merged = vec![("User-Agent".to_string(), user_agent.to_string())];

    for (name, value) in extra {
        match merged
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(slot) => *slot = (name.clone(), value.clone()),
            None => merged.push((name.clone(), value.clone())),
        }
    }

    merged
}
