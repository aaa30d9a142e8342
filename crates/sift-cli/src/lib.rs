//! Sift CLI library components.
//!
//! The binary in `main.rs` only parses arguments and installs logging; every
//! command lives here so it can be driven from tests with a spy console.

pub mod commands;
pub mod console;
pub mod context;
pub mod engines;
pub mod listeners;
pub mod logging;
pub mod output;
#[cfg(any(test, feature = "test-support"))]
pub mod testkit;
pub mod viewers;
pub mod writers;

pub use console::{Console, TerminalConsole};
pub use context::AppContext;

/// Errors in how the command line was put together.
#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("Rule output file '{0}' must end in .json or .csv")]
    UnsupportedRulesOutput(String),

    #[error("Config output file '{0}' must end in .yaml or .yml")]
    UnsupportedConfigOutput(String),

    #[error("{0} already exists; pass -y to overwrite it")]
    WouldOverwrite(String),
}
