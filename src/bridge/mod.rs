//! The bridge orchestrator and its persistence helpers.
//!
//! - [`config`] - `BridgeConfig` and the live-network toggle
//! - [`report`] - the plain-text report
//! - [`delivery`] - best-effort collector POST
//! - [`status`] - exit status contract
//! - [`orchestrator`] - `Bridge`, which runs one request end to end

pub mod config;
pub mod delivery;
pub mod orchestrator;
pub mod report;
pub mod status;

pub use config::{parse_live_flag, BridgeConfig, DEFAULT_PACKAGE, LIVE_ENV_VAR};
pub use delivery::{CollectorDelivery, SECRET_HEADER};
pub use orchestrator::{finalize_summary, panic_message, Bridge, BridgeBuilder};
pub use report::{render_report, write_report};
pub use status::{ExitStatus, RunOutcome};
