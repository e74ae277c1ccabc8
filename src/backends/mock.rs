//! Mock backend for testing.
//!
//! This module provides a configurable mock backend that can be used in
//! tests to simulate engine output, failures and crashes without any
//! network access.

use crate::core::{Backend, BackendError, Finding};

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

/// A mock backend for testing purposes.
///
/// # Examples
///
/// ```rust
/// use auditor_bridge::backends::MockBackend;
/// use auditor_bridge::core::Finding;
/// use serde_json::json;
///
/// // Returns two raw items on every search
/// let backend = MockBackend::new()
///     .with_items(vec![json!({"title": "A"}), json!({"detail": "B", "url": "https://b"})]);
///
/// // Returns already-normalized findings
/// let backend = MockBackend::new().with_findings(vec![Finding::notice("hello")]);
///
/// // Fails every search
/// let backend = MockBackend::failing("engine offline");
/// ```
#[derive(Debug)]
pub struct MockBackend {
    /// Name of this backend instance.
    name: String,
    /// Items returned by every search.
    items: Vec<Value>,
    /// Error message returned instead of items.
    failure: Option<String>,
    /// Panic message raised instead of returning.
    panic_message: Option<String>,
    /// Simulated latency for searches.
    latency: Option<Duration>,
    /// Counter for search operations.
    search_count: AtomicU64,
    /// Arguments of the most recent search.
    last_call: RwLock<Option<(String, bool)>>,
}

impl MockBackend {
    /// Creates a new mock backend that returns no items.
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            items: Vec::new(),
            failure: None,
            panic_message: None,
            latency: None,
            search_count: AtomicU64::new(0),
            last_call: RwLock::new(None),
        }
    }

    /// Creates a mock backend whose searches always fail.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::new()
        }
    }

    /// Creates a mock backend whose searches panic.
    pub fn panicking(message: impl Into<String>) -> Self {
        Self {
            panic_message: Some(message.into()),
            ..Self::new()
        }
    }

    /// Sets the name of this backend.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the raw items returned by every search.
    pub fn with_items(mut self, items: Vec<Value>) -> Self {
        self.items = items;
        self
    }

    /// Sets the items from normalized findings.
    pub fn with_findings(self, findings: Vec<Finding>) -> Self {
        self.with_items(findings.into_iter().map(Finding::into_raw).collect())
    }

    /// Sets the simulated latency for searches.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns the number of searches performed.
    pub fn search_count(&self) -> u64 {
        self.search_count.load(Ordering::Relaxed)
    }

    /// Returns the `(query, use_proxy)` of the most recent search.
    pub fn last_call(&self) -> Option<(String, bool)> {
        self.last_call
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &str, use_proxy: bool) -> Result<Vec<Value>, BackendError> {
        self.search_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_call
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some((query.to_string(), use_proxy));

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(message) = &self.panic_message {
            panic!("{}", message);
        }

        if let Some(reason) = &self.failure {
            return Err(BackendError::unavailable(&self.name, reason));
        }

        Ok(self.items.clone())
    }
}
