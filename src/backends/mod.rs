//! Search backend implementations.
//!
//! This module contains implementations of the `Backend` trait.
//!
//! ## Available Backends
//!
//! - [`public_search`] - Public instant-answer API, offline by default
//! - [`mock`] - A mock backend for testing
//!
//! ## Implementing a Custom Backend
//!
//! Implement the `Backend` trait and register it in a
//! [`ModuleRegistry`](crate::engine::ModuleRegistry):
//!
//! ```rust,ignore
//! use auditor_bridge::core::{Backend, BackendError};
//! use async_trait::async_trait;
//! use serde_json::{json, Value};
//!
//! #[derive(Debug)]
//! pub struct MyBackend;
//!
//! #[async_trait]
//! impl Backend for MyBackend {
//!     fn name(&self) -> &str {
//!         "my-backend"
//!     }
//!
//!     async fn search(&self, query: &str, _use_proxy: bool) -> Result<Vec<Value>, BackendError> {
//!         Ok(vec![json!({ "title": query })])
//!     }
//! }
//! ```

pub mod mock;
pub mod public_search;

// Re-exports
pub use mock::MockBackend;
pub use public_search::{parse_instant_answer, PublicSearchBackend, PublicSearchConfig};
