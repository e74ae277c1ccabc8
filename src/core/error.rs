//! Error types for the auditor bridge.
//!
//! Each layer has its own structured error type. None of them are meant to
//! reach the process boundary as a crash: the resolver turns backend and
//! lookup errors into log lines, the fetch layer reports transport failures
//! as data, and the orchestrator maps everything except a fatal fault into
//! its exit status.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a search backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend cannot serve requests right now.
    #[error("backend '{engine}' is unavailable: {reason}")]
    Unavailable {
        /// Name of the backend.
        engine: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The backend's upstream returned something it could not interpret.
    #[error("unexpected response from backend '{engine}': {details}")]
    Protocol {
        /// Name of the backend.
        engine: String,
        /// What was wrong with the response.
        details: String,
    },

    /// An internal error occurred inside the backend.
    #[error("internal backend error: {message}")]
    Internal {
        /// Description of the error.
        message: String,
    },
}

impl BackendError {
    /// Returns a stable classification used in run logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => "Unavailable",
            Self::Protocol { .. } => "Protocol",
            Self::Internal { .. } => "Internal",
        }
    }

    /// Creates an `Unavailable` error.
    pub fn unavailable(engine: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            engine: engine.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `Protocol` error.
    pub fn protocol(engine: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Protocol {
            engine: engine.into(),
            details: details.into(),
        }
    }

    /// Creates an `Internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Errors produced while turning raw backend items into findings.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// An item was not a JSON object.
    #[error("item {index} is a JSON {found}, expected an object")]
    NotAnObject {
        /// Zero-based position of the item in the backend output.
        index: usize,
        /// JSON type that was found instead.
        found: &'static str,
    },
}

/// Errors raised while resolving or running the engine.
///
/// The resolver never lets these escape; they are written to the run log
/// and collapsed into a degraded summary.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No module is registered under the looked-up name.
    #[error("no module named '{name}'")]
    ModuleNotFound {
        /// Module name that was looked up.
        name: String,
    },

    /// The module exists but does not export the entry point.
    #[error("module '{module}' has no export '{symbol}'")]
    EntryPointMissing {
        /// Module that was inspected.
        module: String,
        /// Missing export name.
        symbol: String,
    },

    /// The export exists but cannot be invoked as a search entry point.
    #[error("export '{module}.{symbol}' is a {found}, not a search(query, use_proxy) entry point")]
    NotInvocable {
        /// Module that was inspected.
        module: String,
        /// Export name.
        symbol: String,
        /// What the export actually is.
        found: String,
    },

    /// The backend returned an error.
    #[error("search() raised: {0}")]
    Invocation(#[from] BackendError),

    /// The backend output could not be normalized.
    #[error("normalization failed: {0}")]
    Normalize(#[from] NormalizeError),
}

impl ResolveError {
    /// Returns a stable classification used in run logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ModuleNotFound { .. } => "ModuleNotFound",
            Self::EntryPointMissing { .. } => "EntryPointMissing",
            Self::NotInvocable { .. } => "NotInvocable",
            Self::Invocation(inner) => inner.kind(),
            Self::Normalize(_) => "NormalizeError",
        }
    }
}

/// Errors raised while setting up the fetch layer.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {message}")]
    ClientBuild {
        /// Error reported by the client builder.
        message: String,
    },
}

/// Errors raised while posting a result to the remote collector.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The result could not be encoded.
    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),

    /// The request never produced a response.
    #[error("collector transport error: {message}")]
    Transport {
        /// Transport error message.
        message: String,
    },

    /// The delivery client could not be constructed.
    #[error("collector client unavailable: {message}")]
    Unavailable {
        /// Reason the client is unavailable.
        message: String,
    },
}

impl DeliveryError {
    /// Returns a stable classification used in run logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Encode(_) => "Encode",
            Self::Transport { .. } => "Transport",
            Self::Unavailable { .. } => "Unavailable",
        }
    }
}

/// Errors visible at the orchestrator boundary.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The request could not be read or parsed.
    #[error("input error: {reason}")]
    Input {
        /// What went wrong.
        reason: String,
    },

    /// The primary output could not be written.
    #[error("failed to write output {path}: {source}")]
    Output {
        /// Destination that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The text report could not be written.
    #[error("failed to write report {path}: {source}")]
    Report {
        /// Destination that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A value could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The bridge configuration is invalid.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// An unclassified fault.
    #[error("fatal error: {message}")]
    Fatal {
        /// Description of the fault.
        message: String,
    },
}

impl BridgeError {
    /// Returns `true` if this error should end the run with the fatal status.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }

    /// Creates an `Input` error.
    pub fn input(reason: impl Into<String>) -> Self {
        Self::Input {
            reason: reason.into(),
        }
    }

    /// Creates a `Configuration` error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a `Fatal` error.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal {
            message: message.into(),
        }
    }
}

/// A specialized `Result` type for orchestrator operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_error_kind_follows_backend() {
        let err = ResolveError::from(BackendError::unavailable("public-search", "offline"));
        assert_eq!(err.kind(), "Unavailable");
        assert!(err.to_string().contains("search() raised"));

        let err = ResolveError::from(NormalizeError::NotAnObject {
            index: 3,
            found: "string",
        });
        assert_eq!(err.kind(), "NormalizeError");
        assert!(err.to_string().contains("item 3"));
    }

    #[test]
    fn test_not_invocable_display() {
        let err = ResolveError::NotInvocable {
            module: "engine.search".into(),
            symbol: "search".into(),
            found: "fetch helper".into(),
        };
        assert_eq!(
            err.to_string(),
            "export 'engine.search.search' is a fetch helper, not a search(query, use_proxy) entry point"
        );
    }

    #[test]
    fn test_bridge_error_is_fatal() {
        assert!(BridgeError::fatal("boom").is_fatal());
        assert!(!BridgeError::input("bad json").is_fatal());
        assert!(!BridgeError::configuration("zero timeout").is_fatal());
    }
}
