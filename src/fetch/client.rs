//! HTTP GET with an offline-safe fallback.
//!
//! The network client is a capability: with the `http` feature a
//! `reqwest` client performs real requests, without it (or with
//! [`Fetcher::offline`]) every fetch returns the deterministic offline
//! stub. Neither path ever returns an error to the caller.

use crate::core::FetchError;
use crate::fetch::config::{FetchConfig, FetchRequest};
use crate::fetch::outcome::FetchOutcome;
#[cfg(feature = "http")]
use crate::fetch::{config::merge_headers, outcome::FetchErrorKind};

/// Fetches URLs for backends.
///
/// Direct and proxied requests use separate clients, so a single fetch is
/// either routed through the proxy or not, never a mix.
///
/// # Example
///
/// ```rust,ignore
/// use auditor_bridge::fetch::{FetchConfig, FetchRequest, Fetcher};
///
/// let fetcher = Fetcher::new(FetchConfig::default())?;
/// let outcome = fetcher.fetch(&FetchRequest::get("https://api.example.org/")).await;
/// if outcome.is_live_success() {
///     println!("{:?}", outcome.parsed_json);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Fetcher {
    config: FetchConfig,
    #[cfg(feature = "http")]
    transport: Option<Transport>,
}

#[cfg(feature = "http")]
#[derive(Debug, Clone)]
struct Transport {
    direct: reqwest::Client,
    /// A bad proxy URL only breaks proxied requests, so the build error is
    /// kept and reported per call.
    proxied: Result<reqwest::Client, String>,
}

impl Fetcher {
    /// Creates a fetcher backed by a live HTTP client.
    #[cfg(feature = "http")]
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let direct = reqwest::Client::builder()
            .timeout(config.timeout)
            .no_proxy()
            .build()
            .map_err(|e| FetchError::ClientBuild {
                message: e.to_string(),
            })?;

        let proxied = reqwest::Proxy::all(config.proxy_url.as_str())
            .and_then(|proxy| {
                reqwest::Client::builder()
                    .timeout(config.timeout)
                    .proxy(proxy)
                    .build()
            })
            .map_err(|e| e.to_string());

        if let Err(reason) = &proxied {
            tracing::warn!(
                proxy = %config.proxy_url,
                reason = %reason,
                "Proxy client unavailable, proxied fetches will fail"
            );
        }

        Ok(Self {
            config,
            transport: Some(Transport { direct, proxied }),
        })
    }

    /// Creates a fetcher; without the `http` feature it is always offline.
    #[cfg(not(feature = "http"))]
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        Ok(Self::offline_with(config))
    }

    /// Creates a fetcher with no network client capability.
    pub fn offline() -> Self {
        Self::offline_with(FetchConfig::default())
    }

    /// Creates an offline fetcher that keeps `config`.
    pub fn offline_with(config: FetchConfig) -> Self {
        Self {
            config,
            #[cfg(feature = "http")]
            transport: None,
        }
    }

    /// Returns `true` if a network client is available.
    pub fn is_available(&self) -> bool {
        #[cfg(feature = "http")]
        {
            self.transport.is_some()
        }

        #[cfg(not(feature = "http"))]
        {
            false
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Performs one GET.
    pub async fn fetch(&self, request: &FetchRequest) -> FetchOutcome {
        #[cfg(feature = "http")]
        {
            if let Some(transport) = &self.transport {
                return self.fetch_live(transport, request).await;
            }
        }

        tracing::debug!(url = %request.url, "No HTTP client, serving offline stub");
        FetchOutcome::offline(request.url.as_str())
    }

    #[cfg(feature = "http")]
    async fn fetch_live(&self, transport: &Transport, request: &FetchRequest) -> FetchOutcome {
        let client = if request.use_proxy {
            match &transport.proxied {
                Ok(client) => client,
                Err(reason) => {
                    return FetchOutcome::transport_failure(
                        request.url.as_str(),
                        FetchErrorKind::Builder,
                        format!("proxy unavailable: {}", reason),
                    );
                }
            }
        } else {
            &transport.direct
        };

        let timeout = request.timeout.unwrap_or(self.config.timeout);
        let mut builder = client.get(request.url.as_str()).timeout(timeout);
        for (name, value) in merge_headers(&self.config.user_agent, &request.headers) {
            builder = builder.header(name, value);
        }

        tracing::debug!(
            url = %request.url,
            use_proxy = request.use_proxy,
            timeout_ms = timeout.as_millis() as u64,
            "Fetching"
        );

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let kind = classify(&e);
                tracing::warn!(url = %request.url, kind = %kind, error = %e, "Fetch failed");
                return FetchOutcome::transport_failure(request.url.as_str(), kind, error_chain(&e));
            }
        };

        let status = response.status().as_u16();
        let resolved_url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        match response.text().await {
            Ok(body) => FetchOutcome::from_response(status, resolved_url, body, request.return_both)
                .with_headers(headers),
            Err(e) => {
                let kind = match classify(&e) {
                    FetchErrorKind::Timeout => FetchErrorKind::Timeout,
                    _ => FetchErrorKind::Body,
                };
                FetchOutcome::transport_failure(resolved_url, kind, error_chain(&e))
            }
        }
    }
}

#[cfg(feature = "http")]
fn classify(error: &reqwest::Error) -> FetchErrorKind {
    if error.is_timeout() {
        FetchErrorKind::Timeout
    } else if error.is_connect() {
        FetchErrorKind::Connect
    } else if error.is_builder() {
        FetchErrorKind::Builder
    } else if error.is_body() || error.is_decode() {
        FetchErrorKind::Body
    } else {
        FetchErrorKind::Request
    }
}

/// Joins an error with its sources.
#[cfg(feature = "http")]
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
