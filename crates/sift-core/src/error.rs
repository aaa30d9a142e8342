//! Error types for sift core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for sift operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving, dispatching and rendering a run.
#[derive(Debug, Error)]
pub enum Error {
    /// A rule selector could not be parsed.
    #[error("Invalid rule selector '{selector}': {reason}")]
    InvalidSelector {
        /// The offending selector token.
        selector: String,
        /// Why the token was rejected.
        reason: String,
    },

    /// A severity value was neither a number in 1-5 nor a known name.
    #[error("Invalid severity '{value}': expected 1-5 or one of critical, high, moderate, low, info")]
    InvalidSeverity {
        /// The rejected input.
        value: String,
    },

    /// An explicitly named target does not exist.
    #[error("Target not found: {path}")]
    TargetNotFound {
        /// The missing path as the user typed it.
        path: PathBuf,
    },

    /// An engine's run rejected, failing the whole dispatch.
    #[error("Engine '{engine}' failed: {message}")]
    EngineFailed {
        /// Name of the engine that failed.
        engine: String,
        /// The engine's error message.
        message: String,
    },

    /// No registered engine carries this name.
    #[error("No engine registered with name '{name}'")]
    EngineNotFound {
        /// The requested engine name.
        name: String,
    },

    /// Two engines share a name, ignoring case.
    #[error("Duplicate engine name '{name}': engine names must be unique ignoring case")]
    DuplicateEngine {
        /// The name of the engine that was rejected.
        name: String,
    },

    /// The configuration names an engine kind with no constructor.
    #[error("Unknown engine kind '{kind}' for engine '{engine}'")]
    UnknownEngineKind {
        /// The configured engine name.
        engine: String,
        /// The unrecognised kind identifier.
        kind: String,
    },

    /// The catalog cache could not be parsed.
    #[error("Catalog cache {path} is corrupt: {message}")]
    CatalogCorrupt {
        /// Location of the cache file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// An output file has an extension no writer understands.
    #[error("Unsupported output file '{path}': supported extensions are {supported}")]
    UnsupportedOutputFile {
        /// The rejected output path.
        path: PathBuf,
        /// Human-readable list of accepted extensions.
        supported: String,
    },

    /// Table output was requested together with an output file.
    #[error("The table format cannot be written to a file ({path}); choose csv, xml, junit, json, sarif or html")]
    TableToFile {
        /// The output path that was requested.
        path: PathBuf,
    },

    /// A formatted body was read with the wrong shape.
    #[error("Result body is {actual}, but {expected} was required")]
    FormatMismatch {
        /// The shape the caller asked for.
        expected: &'static str,
        /// The shape the results actually hold.
        actual: &'static str,
    },

    /// A glob or target pattern failed to compile.
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true when the error signals a broken contract between
    /// components rather than bad user input.
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::FormatMismatch { .. })
    }

    /// Returns true for errors detected before any engine runs.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidSelector { .. }
                | Error::InvalidSeverity { .. }
                | Error::TargetNotFound { .. }
                | Error::UnknownEngineKind { .. }
                | Error::DuplicateEngine { .. }
                | Error::UnsupportedOutputFile { .. }
                | Error::TableToFile { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_classification() {
        let err = Error::FormatMismatch {
            expected: "text",
            actual: "table",
        };
        assert!(err.is_internal());
        assert!(!err.is_configuration());

        let err = Error::TableToFile {
            path: PathBuf::from("out.txt"),
        };
        assert!(!err.is_internal());
        assert!(err.is_configuration());
    }

    #[test]
    fn test_engine_failure_message_names_engine() {
        let err = Error::EngineFailed {
            engine: "apex".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Engine 'apex' failed: boom");
    }
}
