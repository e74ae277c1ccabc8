//! The fetch layer.
//!
//! A minimal HTTP GET helper used by the default backend:
//!
//! - [`config`] - `FetchConfig`, `FetchRequest` and header merging
//! - [`outcome`] - `FetchOutcome`, the single result of a fetch
//! - [`client`] - `Fetcher`, live or offline

pub mod client;
pub mod config;
pub mod outcome;

pub use client::Fetcher;
pub use config::{FetchConfig, FetchRequest, DEFAULT_PROXY_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use outcome::{FetchErrorKind, FetchMode, FetchOutcome, CLIENT_NOT_AVAILABLE};
