//! Core types and traits for the auditor bridge.
//!
//! - [`types`] - `Finding` and `ScanRequest`
//! - [`result`] - the `ScanResult` artifact
//! - [`log`] - the append-only `RunLog`
//! - [`traits`] - the `Backend` trait
//! - [`error`] - structured error types

pub mod error;
pub mod log;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{
    BackendError, BridgeError, BridgeResult, DeliveryError, FetchError, NormalizeError,
    ResolveError,
};
pub use log::RunLog;
pub use result::ScanResult;
pub use traits::{ArcBackend, Backend, BoxedBackend};
pub use types::{kind, Finding, ScanRequest};
