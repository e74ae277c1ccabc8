//! Exit status contract.

use crate::core::ScanResult;

use std::fmt;

/// How a run ended. Each variant maps to a fixed process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    /// The engine ran or degraded gracefully (0).
    Success,
    /// The request could not be read (1).
    InputError,
    /// The primary output could not be written (2).
    OutputError,
    /// An unclassified fault (99).
    Fatal,
}

impl ExitStatus {
    /// Returns the process exit code.
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::InputError => 1,
            Self::OutputError => 2,
            Self::Fatal => 99,
        }
    }

    /// Returns `true` for [`ExitStatus::Success`].
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "success",
            Self::InputError => "input-error",
            Self::OutputError => "output-error",
            Self::Fatal => "fatal",
        };
        write!(f, "{} ({})", name, self.code())
    }
}

/// The result of a run together with its exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// The result document.
    pub result: ScanResult,
    /// Exit status.
    pub status: ExitStatus,
}

impl RunOutcome {
    /// Creates a new outcome.
    pub fn new(result: ScanResult, status: ExitStatus) -> Self {
        Self { result, status }
    }
}
