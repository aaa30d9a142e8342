//! Rule source loading
//!
//! Reads the built-in pack and custom rule files into [`RuleSource`]s and
//! parses them. Compilation happens in the engine so one bad regex only
//! drops its own rule.

use crate::built_in::built_in_rules;
use crate::constants::MAX_RULE_FILE_SIZE;
use crate::rule_file::{PatternRule, PatternRuleFile};
use crate::{Result, RuleError};
use sha2::{Digest, Sha256};
use sift_fs::FileSystem;
use std::path::Path;
use std::sync::Arc;

/// The text of one rule file and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSource {
    /// `builtin:<pack>` or the file path.
    pub label: String,
    pub contents: String,
}

impl RuleSource {
    /// Parse the TOML rule list.
    pub fn parse(&self) -> Result<Vec<PatternRule>> {
        let file: PatternRuleFile =
            toml::from_str(&self.contents).map_err(|source| RuleError::TomlError {
                path: self.label.clone(),
                source,
            })?;
        Ok(file.rules)
    }
}

/// Loads rule sources through the filesystem abstraction
pub struct RuleLoader<F: FileSystem> {
    fs: Arc<F>,
}

impl<F: FileSystem> RuleLoader<F> {
    pub fn new(fs: Arc<F>) -> Self {
        Self { fs }
    }

    /// The embedded pack called `name`.
    pub fn built_in(&self, name: &str) -> Result<RuleSource> {
        let contents =
            built_in_rules(name).ok_or_else(|| RuleError::UnknownBuiltIn(name.to_string()))?;
        Ok(RuleSource {
            label: format!("builtin:{}", name.to_ascii_lowercase()),
            contents: contents.to_string(),
        })
    }

    /// Read a custom rule file, enforcing the size limit before reading.
    pub async fn read_file(&self, path: &Path) -> Result<RuleSource> {
        let metadata = self.fs.metadata(path).await?;
        if !metadata.exists || !metadata.is_file {
            return Err(RuleError::LoadError {
                path: path.display().to_string(),
                message: "not a file".to_string(),
            });
        }
        if metadata.size > MAX_RULE_FILE_SIZE {
            return Err(RuleError::LoadError {
                path: path.display().to_string(),
                message: format!(
                    "file exceeds maximum size of {}MB",
                    MAX_RULE_FILE_SIZE / 1_048_576
                ),
            });
        }

        let contents = self.fs.read_to_string(path).await?;
        Ok(RuleSource {
            label: path.display().to_string(),
            contents,
        })
    }
}

/// First 12 hex digits of a SHA-256 over every source, in order.
pub fn sources_digest(sources: &[RuleSource]) -> String {
    let mut hasher = Sha256::new();
    for source in sources {
        hasher.update(source.label.as_bytes());
        hasher.update([0u8]);
        hasher.update(source.contents.as_bytes());
        hasher.update([0u8]);
    }
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(12);
    digest
}
