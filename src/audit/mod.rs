//! Structured audit logging.
//!
//! This module provides functions for emitting structured audit events
//! using the `tracing` crate under the `auditor_bridge::audit` target.
//! Events can be captured by any tracing subscriber (JSON file,
//! OpenTelemetry, etc.).

mod events;

pub use events::{
    emit_delivery, emit_engine_completed, emit_run_completed, emit_run_started, AuditEvent,
    DeliveryAuditEvent, DeliveryOutcome, RunAuditEvent,
};
