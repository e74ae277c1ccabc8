//! Audit event types and emission functions.

use crate::bridge::RunOutcome;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Base trait for audit events.
pub trait AuditEvent: Serialize {
    /// Returns the event type name.
    fn event_type(&self) -> &'static str;

    /// Returns the timestamp of the event.
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Audit event for a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunAuditEvent {
    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Unique run ID.
    pub run_id: String,

    /// Final summary.
    pub summary: String,

    /// Number of findings in the result.
    pub finding_count: usize,

    /// Number of run-log lines.
    pub log_line_count: usize,

    /// Exit status name.
    pub status: String,

    /// Process exit code.
    pub exit_code: u8,

    /// Wall time of the run in milliseconds.
    pub duration_ms: u64,
}

impl RunAuditEvent {
    /// Builds the event from a run outcome.
    pub fn from_outcome(run_id: &str, outcome: &RunOutcome, elapsed: Duration) -> Self {
        Self {
            timestamp: Utc::now(),
            run_id: run_id.to_string(),
            summary: outcome.result.summary.clone(),
            finding_count: outcome.result.findings.len(),
            log_line_count: outcome.result.log_lines.len(),
            status: outcome.status.to_string(),
            exit_code: outcome.status.code(),
            duration_ms: elapsed.as_millis() as u64,
        }
    }
}

impl AuditEvent for RunAuditEvent {
    fn event_type(&self) -> &'static str {
        "run_completed"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// What happened to a collector delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// The collector answered (any status).
    Delivered,
    /// The POST failed before a response arrived.
    Failed,
    /// No delivery capability was available.
    Skipped,
}

/// Audit event for a collector delivery attempt.
///
/// Only the collector host is recorded, never the full URL or the secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryAuditEvent {
    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Unique run ID.
    pub run_id: String,

    /// Collector host, if the URL parsed.
    pub collector_host: Option<String>,

    /// Whether a secret header was sent.
    pub secret_sent: bool,

    /// Outcome of the attempt.
    pub outcome: DeliveryOutcome,

    /// HTTP status, when the collector answered.
    pub status_code: Option<u16>,

    /// Error classification, when the attempt failed.
    pub error_kind: Option<String>,
}

impl DeliveryAuditEvent {
    /// Creates an event for a delivery to `collector_url`.
    pub fn new(run_id: &str, collector_url: &str, secret_sent: bool, outcome: DeliveryOutcome) -> Self {
        Self {
            timestamp: Utc::now(),
            run_id: run_id.to_string(),
            collector_host: url::Url::parse(collector_url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string)),
            secret_sent,
            outcome,
            status_code: None,
            error_kind: None,
        }
    }

    /// Sets the HTTP status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    /// Sets the error classification.
    pub fn with_error_kind(mut self, kind: impl Into<String>) -> Self {
        self.error_kind = Some(kind.into());
        self
    }
}

impl AuditEvent for DeliveryAuditEvent {
    fn event_type(&self) -> &'static str {
        "collector_delivery"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Emits an audit event for a run starting.
pub fn emit_run_started(run_id: &str, input: &Path, output: &Path, base_dir: &Path) {
    tracing::info!(
        target: "auditor_bridge::audit",
        event_type = "run_started",
        run_id = %run_id,
        input = %input.display(),
        output = %output.display(),
        base_dir = %base_dir.display(),
        "Run started"
    );
}

/// Emits an audit event once the engine resolver has finished.
pub fn emit_engine_completed(run_id: &str, vendor_present: bool, summary: &str, finding_count: usize) {
    tracing::info!(
        target: "auditor_bridge::audit",
        event_type = "engine_completed",
        run_id = %run_id,
        vendor_present,
        summary = %summary,
        finding_count,
        "Engine completed"
    );
}

/// Emits an audit event for a collector delivery attempt.
pub fn emit_delivery(event: &DeliveryAuditEvent) {
    tracing::info!(
        target: "auditor_bridge::audit",
        event_type = event.event_type(),
        run_id = %event.run_id,
        collector_host = ?event.collector_host,
        secret_sent = event.secret_sent,
        outcome = ?event.outcome,
        status_code = ?event.status_code,
        error_kind = ?event.error_kind,
        "Collector delivery attempted"
    );
}

/// Emits an audit event for a finished run.
pub fn emit_run_completed(event: &RunAuditEvent) {
    tracing::info!(
        target: "auditor_bridge::audit",
        event_type = event.event_type(),
        run_id = %event.run_id,
        status = %event.status,
        exit_code = event.exit_code,
        finding_count = event.finding_count,
        log_line_count = event.log_line_count,
        duration_ms = event.duration_ms,
        summary = %event.summary,
        "Run completed"
    );
}
