//! Core domain types shared by every stage of the pipeline.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rule severity. Lower values are more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Severity {
    Critical = 1,
    High = 2,
    Moderate = 3,
    Low = 4,
    Info = 5,
}

impl Severity {
    /// Returns all severities from most to least severe
    pub fn all() -> &'static [Severity] {
        &[
            Severity::Critical,
            Severity::High,
            Severity::Moderate,
            Severity::Low,
            Severity::Info,
        ]
    }

    /// Numeric value in 1-5
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Returns the display name for this severity
    pub fn display_name(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Moderate => "Moderate",
            Severity::Low => "Low",
            Severity::Info => "Info",
        }
    }

    /// Returns the lowercase name for CLI parsing
    pub fn cli_name(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Moderate => "moderate",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }

    /// Look up a severity by its numeric value
    pub fn from_value(value: u8) -> Option<Self> {
        Self::all().iter().find(|s| s.value() == value).copied()
    }

    /// Parse from a CLI name, case-insensitively
    pub fn from_cli_name(s: &str) -> Option<Self> {
        Self::all()
            .iter()
            .find(|sev| sev.cli_name().eq_ignore_ascii_case(s))
            .copied()
    }

    /// "2 (High)"
    pub fn detailed(self) -> String {
        format!("{} ({})", self.value(), self.display_name())
    }
}

impl From<Severity> for u8 {
    fn from(sev: Severity) -> u8 {
        sev.value()
    }
}

impl TryFrom<u8> for Severity {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Severity::from_value(value).ok_or_else(|| Error::InvalidSeverity {
            value: value.to_string(),
        })
    }
}

impl FromStr for Severity {
    type Err = Error;

    /// Accepts `1`-`5` or a severity name.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        trimmed
            .parse::<u8>()
            .ok()
            .and_then(Severity::from_value)
            .or_else(|| Severity::from_cli_name(trimmed))
            .ok_or_else(|| Error::InvalidSeverity {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Raw rule metadata as an engine reports it, before catalog validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDescriptor {
    pub name: String,
    pub severity: u8,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub rulesets: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub resource_urls: Vec<String>,
    #[serde(default)]
    pub is_pilot: bool,
    #[serde(default)]
    pub default_enabled: bool,
}

/// A validated catalog rule, identified by `(name, engine)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub name: String,
    pub engine: String,
    pub severity: Severity,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub rulesets: Vec<String>,
    pub languages: Vec<String>,
    pub description: String,
    pub resource_urls: Vec<String>,
    pub is_pilot: bool,
    pub default_enabled: bool,
}

impl Rule {
    /// Validate a descriptor reported by `engine`.
    ///
    /// Returns the reason as a string so callers can count and report
    /// rejected descriptors without aborting the catalog build.
    pub fn from_descriptor(
        engine: &str,
        descriptor: RuleDescriptor,
    ) -> std::result::Result<Self, String> {
        let name = descriptor.name.trim();
        if name.is_empty() {
            return Err("rule name is empty".to_string());
        }
        let severity = Severity::from_value(descriptor.severity).ok_or_else(|| {
            format!(
                "rule '{}' has severity {}, expected 1-5",
                name, descriptor.severity
            )
        })?;

        Ok(Self {
            name: name.to_string(),
            engine: engine.to_string(),
            severity,
            tags: dedup(descriptor.tags),
            categories: dedup(descriptor.categories),
            rulesets: dedup(descriptor.rulesets),
            languages: dedup(descriptor.languages),
            description: descriptor.description.trim().to_string(),
            resource_urls: descriptor.resource_urls,
            is_pilot: descriptor.is_pilot,
            default_enabled: descriptor.default_enabled,
        })
    }
}

// Order-preserving set semantics for the string lists.
fn dedup(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !out.iter().any(|v| v == &value) {
            out.push(value);
        }
    }
    out
}

/// A named bundle of rule paths owned by one engine (a category or ruleset).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleGroup {
    pub name: String,
    pub engine: String,
    pub paths: Vec<String>,
}

/// The aggregated, engine-agnostic index of all known rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub rules: Vec<Rule>,
    pub categories: Vec<RuleGroup>,
    pub rulesets: Vec<RuleGroup>,
}

impl Catalog {
    /// Rules belonging to `engine`, in discovery order.
    pub fn rules_for_engine<'a>(&'a self, engine: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |r| r.engine == engine)
    }
}

/// One user-supplied target bound to the concrete files one engine will see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleTarget {
    /// The argument as given (file, directory or glob).
    pub target: String,
    /// Whether `target` named a directory; `paths` are then relative to it.
    pub is_directory: bool,
    pub paths: Vec<String>,
}

impl RuleTarget {
    /// Paths resolved against the working directory.
    pub fn resolved_paths(&self) -> Vec<String> {
        if !self.is_directory {
            return self.paths.clone();
        }
        let base = self.target.trim_end_matches('/');
        self.paths
            .iter()
            .map(|p| {
                if p == "." {
                    base.to_string()
                } else if base == "." {
                    p.clone()
                } else {
                    format!("{}/{}", base, p)
                }
            })
            .collect()
    }
}

/// One reported rule infraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub rule: String,
    pub engine: String,
    pub severity: Severity,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
