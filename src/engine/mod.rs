//! Engine resolution.
//!
//! - [`registry`] - modules and exports rooted at the vendor directory
//! - [`strategy`] - ordered lookup strategies
//! - [`normalize`] - raw items to findings, capped
//! - [`resolver`] - ties the above together behind `resolve_and_run`

pub mod normalize;
pub mod registry;
pub mod resolver;
pub mod strategy;

pub use normalize::{normalize_item, normalize_items, MAX_FINDINGS};
pub use registry::{Export, Module, ModuleRegistry};
pub use resolver::{
    EngineResolver, EngineRun, ResolverConfig, DEFAULT_QUERY, ENGINE_UNAVAILABLE,
    ENTRY_POINT_UNAVAILABLE, VENDOR_NOT_FOUND,
};
pub use strategy::{default_strategies, LookupStrategy};
