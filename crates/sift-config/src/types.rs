use serde::{Deserialize, Serialize};

/// Engine kind served by the built-in regex pattern engine.
pub const PATTERN_ENGINE_KIND: &str = "pattern";

/// Main configuration structure for sift
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiftConfig {
    /// Schema version for migrations
    pub version: String,

    /// Configured engines, in registration order
    #[serde(default = "default_engines")]
    pub engines: Vec<EngineSettings>,
}

impl Default for SiftConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            engines: default_engines(),
        }
    }
}

impl SiftConfig {
    /// Get an engine's settings by name
    pub fn engine(&self, name: &str) -> Option<&EngineSettings> {
        self.engines
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    /// Engines that are not disabled, in configuration order
    pub fn enabled_engines(&self) -> impl Iterator<Item = &EngineSettings> {
        self.engines.iter().filter(|e| !e.disabled)
    }
}

/// Settings for one engine instance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineSettings {
    /// Engine name as shown in results
    pub name: String,

    /// Constructor to use from the engine factory table
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Skip this engine entirely
    #[serde(default)]
    pub disabled: bool,

    /// Include globs, or exclusions prefixed with `!`
    #[serde(default)]
    pub target_patterns: Vec<String>,

    /// Built-in rule pack to load, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builtin: Option<String>,
}

impl EngineSettings {
    fn pattern(name: &str, target_patterns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            kind: default_kind(),
            disabled: false,
            target_patterns: target_patterns.iter().map(|p| p.to_string()).collect(),
            builtin: Some(name.to_string()),
        }
    }
}

fn default_kind() -> String {
    PATTERN_ENGINE_KIND.to_string()
}

fn default_engines() -> Vec<EngineSettings> {
    vec![
        EngineSettings::pattern(
            "apex",
            &[
                "**/*.cls",
                "**/*.trigger",
                "!**/node_modules/**",
                "!**/*-meta.xml",
            ],
        ),
        EngineSettings::pattern("javascript", &["**/*.js", "**/*.ts", "!**/node_modules/**"]),
    ]
}
