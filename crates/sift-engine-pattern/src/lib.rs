//! Sift Pattern Engine - regex rules declared in TOML
//!
//! Each engine instance owns one rule set: an optional built-in pack plus any
//! custom rule files registered for its name. Rules are compiled once, on
//! `init`, and matched line by line.
//!
//! # Example
//!
//! ```toml
//! # rules/apex-extra.toml
//! [[rules]]
//! name = "NoSystemDebug"
//! severity = 4
//! description = "System.debug statements should not ship"
//! pattern = "System\\.debug\\("
//! tags = ["Recommended", "Performance"]
//! categories = ["Performance"]
//! languages = ["apex"]
//! ```

pub mod built_in;
pub mod constants;
pub mod engine;
pub mod loader;
pub mod matcher;
pub mod rule_file;

pub use built_in::{built_in_rules, BUILT_IN_PACKS};
pub use constants::*;
pub use engine::PatternEngine;
pub use loader::{RuleLoader, RuleSource};
pub use matcher::{compile_regex_safe, CompiledRule, LineMatch};
pub use rule_file::{PatternRule, PatternRuleFile};

/// Result type for rule operations
pub type Result<T> = std::result::Result<T, RuleError>;

/// Error types for the pattern engine
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Invalid pattern in rule '{rule}': {message}")]
    InvalidPattern { rule: String, message: String },

    #[error("Failed to load rules from {path}: {message}")]
    LoadError { path: String, message: String },

    #[error("Invalid TOML in {path}: {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unknown built-in rule pack '{0}'")]
    UnknownBuiltIn(String),
}

impl From<RuleError> for sift_core::Error {
    fn from(e: RuleError) -> Self {
        match e {
            RuleError::IoError(io) => sift_core::Error::Io(io),
            other => sift_core::Error::Pattern(other.to_string()),
        }
    }
}
