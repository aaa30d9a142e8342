//! TOML rule definitions
//!
//! This module defines the structure of rules as they appear in TOML files.

use crate::constants::DEFAULT_SEVERITY;
use serde::{Deserialize, Serialize};
use sift_core::RuleDescriptor;

/// A complete TOML rule file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PatternRuleFile {
    #[serde(default)]
    pub rules: Vec<PatternRule>,
}

/// One regex rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PatternRule {
    pub name: String,

    #[serde(default = "default_severity")]
    pub severity: u8,

    #[serde(default)]
    pub description: String,

    /// Regex matched against each line.
    pub pattern: String,

    /// Violation message; the description is used when absent.
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub rulesets: Vec<String>,

    #[serde(default)]
    pub languages: Vec<String>,

    #[serde(default)]
    pub resource_urls: Vec<String>,

    #[serde(default = "default_enabled")]
    pub default_enabled: bool,

    #[serde(default)]
    pub pilot: bool,
}

fn default_severity() -> u8 {
    DEFAULT_SEVERITY
}

fn default_enabled() -> bool {
    true
}

impl PatternRule {
    /// Catalog metadata for this rule.
    pub fn to_descriptor(&self) -> RuleDescriptor {
        RuleDescriptor {
            name: self.name.clone(),
            severity: self.severity,
            tags: self.tags.clone(),
            categories: self.categories.clone(),
            rulesets: self.rulesets.clone(),
            languages: self.languages.clone(),
            description: self.description.clone(),
            resource_urls: self.resource_urls.clone(),
            is_pilot: self.pilot,
            default_enabled: self.default_enabled,
        }
    }

    /// The text reported with each violation.
    pub fn violation_message(&self) -> &str {
        match &self.message {
            Some(message) if !message.trim().is_empty() => message,
            _ => &self.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let file: PatternRuleFile = toml::from_str(
            r#"
[[rules]]
name = "NoEval"
pattern = "\\beval\\("
description = "eval is dangerous"
"#,
        )
        .unwrap();

        let rule = &file.rules[0];
        assert_eq!(rule.severity, DEFAULT_SEVERITY);
        assert!(rule.default_enabled);
        assert!(!rule.pilot);
        assert_eq!(rule.violation_message(), "eval is dangerous");

        let descriptor = rule.to_descriptor();
        assert_eq!(descriptor.name, "NoEval");
        assert!(descriptor.default_enabled);
    }

    #[test]
    fn test_missing_pattern_is_rejected() {
        let parsed: Result<PatternRuleFile, _> = toml::from_str(
            r#"
[[rules]]
name = "Broken"
"#,
        );
        assert!(parsed.is_err());
    }
}
