//! Security and performance limits for the pattern engine
//!
//! These limits guard against:
//! - ReDoS (Regular Expression Denial of Service)
//! - Memory exhaustion from oversized rule files or sources

/// Maximum size for TOML rule files (1MB)
pub const MAX_RULE_FILE_SIZE: u64 = 1_048_576; // 1MB

/// Maximum size of a source file scanned by `run` (10MB)
///
/// Larger files are skipped with a warning.
pub const MAX_CONTENT_SIZE: u64 = 10_485_760; // 10MB

/// Maximum regex pattern length (500 characters)
pub const MAX_REGEX_LENGTH: usize = 500;

/// Compiled regex size limit (10MB)
///
/// Applied during regex compilation via RegexBuilder.
pub const REGEX_SIZE_LIMIT: usize = 10_000_000; // 10MB

/// Regex DFA size limit (2MB)
pub const REGEX_DFA_SIZE_LIMIT: usize = 2_000_000; // 2MB

/// Severity used when a rule does not declare one (Moderate).
pub const DEFAULT_SEVERITY: u8 = 3;
