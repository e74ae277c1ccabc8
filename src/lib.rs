//! # Auditor Bridge
//!
//! A fail-soft request/response bridge around a pluggable search engine.
//!
//! ## Overview
//!
//! For each scan request the bridge:
//!
//! - Checks whether the engine's vendor tree is present
//! - Locates the engine's `search` entry point with ordered lookup strategies
//! - Invokes it and normalizes whatever comes back into fixed findings
//! - Writes a plain-text report and the result JSON
//! - Optionally posts the result to a remote collector
//!
//! Backend absence or failure never aborts a run; it degrades to a stub
//! summary with an explanatory run log.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use auditor_bridge::bridge::{Bridge, BridgeConfig};
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bridge = Bridge::builder()
//!         .with_config(BridgeConfig::new().with_base_dir("/srv/auditor"))
//!         .build()?;
//!
//!     let outcome = bridge
//!         .run_guarded(Path::new("request.json"), Path::new("result.json"))
//!         .await;
//!
//!     println!("{} -> {}", outcome.result.summary, outcome.status);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `default` - Includes `http`
//! - `http` - Live fetches and collector delivery via `reqwest`; without it
//!   the fetch layer always serves the offline stub
//!
//! ## Architecture
//!
//! - **Core**: findings, requests, results, the run log, errors
//! - **Fetch**: HTTP GET with an offline-safe fallback
//! - **Backends**: the `Backend` trait and its implementations
//! - **Engine**: module registry, lookup strategies, normalization
//! - **Bridge**: orchestration, report, delivery, exit status
//! - **Audit**: structured audit events

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod audit;
pub mod backends;
pub mod bridge;
pub mod cli;
pub mod core;
pub mod engine;
pub mod fetch;

// Re-export commonly used types at the crate root
pub use crate::core::{
    Backend, BackendError, BridgeError, BridgeResult, Finding, RunLog, ScanRequest, ScanResult,
};

pub use crate::bridge::{Bridge, BridgeConfig, ExitStatus, RunOutcome};
pub use crate::engine::{EngineResolver, ModuleRegistry};
pub use crate::fetch::{FetchOutcome, Fetcher};

/// Prelude module for convenient imports.
///
/// ```rust
/// use auditor_bridge::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backends::{MockBackend, PublicSearchBackend, PublicSearchConfig};
    pub use crate::bridge::{Bridge, BridgeConfig, ExitStatus, RunOutcome};
    pub use crate::core::{
        ArcBackend, Backend, BackendError, BridgeError, BridgeResult, Finding, RunLog,
        ScanRequest, ScanResult,
    };
    pub use crate::engine::{EngineResolver, Export, Module, ModuleRegistry, ResolverConfig};
    pub use crate::fetch::{FetchConfig, FetchOutcome, FetchRequest, Fetcher};
}
