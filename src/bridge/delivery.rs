//! Best-effort delivery of the result to a remote collector.

use crate::core::{DeliveryError, ScanResult};

use secrecy::SecretString;
#[cfg(feature = "http")]
use secrecy::ExposeSecret;
use std::time::Duration;

/// Header carrying the collector secret.
pub const SECRET_HEADER: &str = "X-Auditor-Secret";

/// Posts a [`ScanResult`] to a collector URL.
///
/// One attempt per call, no retries.
#[derive(Debug, Clone)]
pub struct CollectorDelivery {
    timeout: Duration,
    #[cfg(feature = "http")]
    client: reqwest::Client,
}

impl CollectorDelivery {
    /// Creates a delivery client.
    #[cfg(feature = "http")]
    pub fn new(timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::Unavailable {
                message: e.to_string(),
            })?;
        Ok(Self { timeout, client })
    }

    /// Without the `http` feature there is no delivery capability.
    #[cfg(not(feature = "http"))]
    pub fn new(_timeout: Duration) -> Result<Self, DeliveryError> {
        Err(DeliveryError::Unavailable {
            message: "built without the http feature".to_string(),
        })
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Posts `result` as JSON and returns the HTTP status.
    ///
    /// Any status counts as delivered; only transport failures are errors.
    #[cfg(feature = "http")]
    pub async fn post(
        &self,
        url: &str,
        secret: Option<&SecretString>,
        result: &ScanResult,
    ) -> Result<u16, DeliveryError> {
        let body = serde_json::to_vec(result)?;

        let mut request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(secret) = secret {
            request = request.header(SECRET_HEADER, secret.expose_secret());
        }

        let response = request.send().await.map_err(|e| DeliveryError::Transport {
            message: e.to_string(),
        })?;
        let status = response.status().as_u16();

        tracing::debug!(url = %url, status, "Collector responded");
        Ok(status)
    }

    /// Without the `http` feature every post fails as unavailable.
    #[cfg(not(feature = "http"))]
    pub async fn post(
        &self,
        _url: &str,
        _secret: Option<&SecretString>,
        _result: &ScanResult,
    ) -> Result<u16, DeliveryError> {
        Err(DeliveryError::Unavailable {
            message: "built without the http feature".to_string(),
        })
    }
}
