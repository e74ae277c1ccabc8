//! Plain-text report.

use crate::core::{BridgeError, BridgeResult, Finding};

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// First line of every report.
pub const REPORT_TITLE: &str = "Auditor Bridge Report";

/// File name of a report generated at `at`.
pub fn report_file_name(at: &DateTime<Local>) -> String {
    format!("auditor_report_{}.txt", at.format("%Y%m%d_%H%M%S"))
}

/// Renders the report text.
///
/// ```text
/// Auditor Bridge Report
/// Generated at: 2026-01-02 03:04:05
///
/// === SUMMARY ===
/// <summary>
///
/// === FINDINGS ===
/// 001. [topic] detail   @ https://...
///
/// === LOG ===
/// <log lines>
/// ```
///
/// The summary block is omitted when the summary is empty and the log
/// block when there are no log lines; the findings block is always there.
pub fn render_report(
    summary: &str,
    findings: &[Finding],
    log_lines: &[String],
    generated_at: &DateTime<Local>,
) -> String {
    let mut lines = vec![
        REPORT_TITLE.to_string(),
        format!("Generated at: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        String::new(),
    ];

    if !summary.is_empty() {
        lines.push("=== SUMMARY ===".to_string());
        lines.push(summary.to_string());
        lines.push(String::new());
    }

    lines.push("=== FINDINGS ===".to_string());
    if findings.is_empty() {
        lines.push("(no findings)".to_string());
    } else {
        lines.extend(
            findings
                .iter()
                .enumerate()
                .map(|(i, finding)| format!("{:03}. {}", i + 1, finding)),
        );
    }
    lines.push(String::new());

    if !log_lines.is_empty() {
        lines.push("=== LOG ===".to_string());
        lines.extend(log_lines.iter().cloned());
    }

    lines.join("\n")
}

/// Writes a timestamped report into `reports_dir`, creating it if needed.
pub async fn write_report(
    reports_dir: &Path,
    summary: &str,
    findings: &[Finding],
    log_lines: &[String],
) -> BridgeResult<PathBuf> {
    let now = Local::now();
    let path = reports_dir.join(report_file_name(&now));
    let text = render_report(summary, findings, log_lines, &now);

    let report_error = |source| BridgeError::Report {
        path: path.clone(),
        source,
    };
    tokio::fs::create_dir_all(reports_dir)
        .await
        .map_err(report_error)?;
    tokio::fs::write(&path, text).await.map_err(report_error)?;

    tracing::debug!(path = %path.display(), findings = findings.len(), "Report written");
    Ok(path)
}
