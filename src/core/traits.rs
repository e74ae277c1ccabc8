//! Core traits for the auditor bridge.
//!
//! This module defines the `Backend` trait that every search engine
//! implements.

use crate::core::error::BackendError;

use async_trait::async_trait;
use std::fmt::Debug;

/// A pluggable search engine.
///
/// A backend has exactly one required operation, `search`, which returns
/// "finding-like" JSON objects. The engine resolver normalizes them, so a
/// backend may use alternate key names (`title` for `detail`, `url` for
/// `location`).
///
/// # Implementation Notes
///
/// - Implementations must be `Send + Sync`.
/// - An empty `query` is passive mode: no network traffic.
/// - Implementations should report failures as `BackendError` rather than
///   panicking. A panic is treated as an unclassified fault and ends the run
///   with the fatal status.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use auditor_bridge::core::{Backend, BackendError, Finding};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct StaticBackend;
///
/// #[async_trait]
/// impl Backend for StaticBackend {
///     fn name(&self) -> &str {
///         "static"
///     }
///
///     async fn search(
///         &self,
///         query: &str,
///         _use_proxy: bool,
///     ) -> Result<Vec<serde_json::Value>, BackendError> {
///         Ok(vec![Finding::notice(format!("no index for '{}'", query)).into_raw()])
///     }
/// }
/// ```
#[async_trait]
pub trait Backend: Send + Sync + Debug {
    /// Returns the name of this backend.
    fn name(&self) -> &str;

    /// Runs a search.
    ///
    /// # Arguments
    ///
    /// * `query` - The search terms. Empty means passive mode.
    /// * `use_proxy` - Route network traffic through the anonymizing proxy.
    async fn search(
        &self,
        query: &str,
        use_proxy: bool,
    ) -> Result<Vec<serde_json::Value>, BackendError>;
}

/// A boxed backend for type-erased storage.
pub type BoxedBackend = Box<dyn Backend>;

/// An arc-wrapped backend for shared ownership.
pub type ArcBackend = std::sync::Arc<dyn Backend>;
