//! Scan result structures.
//!
//! `ScanResult` is the only machine-readable artifact the bridge produces.
//! Its JSON shape is fixed: `summary`, `findings`, `log_lines`.

use crate::core::log::RunLog;
use crate::core::types::Finding;

use serde::{Deserialize, Serialize};

/// Maximum length of a fault description carried in a fatal result.
pub const MAX_FAULT_LEN: usize = 2000;

/// The complete outcome of one bridge run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// One sentence describing the run. Never empty in final output.
    pub summary: String,

    /// Normalized findings in display order.
    pub findings: Vec<Finding>,

    /// The run log, in append order.
    pub log_lines: Vec<String>,
}

impl ScanResult {
    /// Creates a new result.
    pub fn new(summary: impl Into<String>, findings: Vec<Finding>, log: RunLog) -> Self {
        Self {
            summary: summary.into(),
            findings,
            log_lines: log.into_lines(),
        }
    }

    /// Result emitted when the request could not be read.
    pub fn input_failure(log: RunLog) -> Self {
        Self::new("Input error: request could not be read.", Vec::new(), log)
    }

    /// Minimal result emitted after an unclassified fault.
    ///
    /// Keeps every line of `log` and appends the fault description,
    /// truncated to [`MAX_FAULT_LEN`] characters.
    pub fn fatal(log: RunLog, fault: &str) -> Self {
        let fault = truncate(fault, MAX_FAULT_LEN);
        let summary = match fault.lines().next() {
            Some(first) if !first.trim().is_empty() => format!("Bridge crashed: {}", first),
            _ => "Bridge crashed.".to_string(),
        };
        let mut log_lines = log.into_lines();
        log_lines.push(fault);
        Self {
            summary,
            findings: Vec::new(),
            log_lines,
        }
    }

    /// Returns the number of findings.
    pub fn finding_count(&self) -> usize {
        self.findings.len()
    }

    /// Returns `true` if the result carries no findings.
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Serializes the result as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
