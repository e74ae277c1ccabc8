//! The append-only run log.

/// Ordered diagnostic trail for a single run.
///
/// Lines are only ever appended: never reordered, deduplicated or dropped.
/// Every append is mirrored to `tracing` at debug level so the same trail
/// shows up in process diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunLog {
    lines: Vec<String>,
}

impl RunLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line.
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(target: "auditor_bridge::runlog", "{}", line);
        self.lines.push(line);
    }

    /// Appends every line from an iterator, in order.
    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.push(line);
        }
    }

    /// Returns the lines appended so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns the number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if nothing was logged.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns `true` if any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }

    /// Consumes the log, returning its lines.
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
