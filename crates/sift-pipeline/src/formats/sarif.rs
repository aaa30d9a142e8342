//! SARIF (Static Analysis Results Interchange Format) output.
//!
//! One run per engine, so consumers can attribute results to the tool that
//! produced them.

use super::FormatContext;
use crate::dispatcher::EngineBatch;
use serde::{Deserialize, Serialize};
use sift_core::{Result, Severity, Violation};

/// SARIF schema URL
const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

/// SARIF version
const SARIF_VERSION: &str = "2.1.0";

/// Root SARIF document structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifReport {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub version: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub rules: Vec<SarifRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRule {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<SarifRuleProperties>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifRuleProperties {
    pub category: String,
    pub severity: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    pub rule_id: String,
    pub rule_index: usize,
    pub level: SarifLevel,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
}

/// SARIF severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SarifLevel {
    Error,
    Warning,
    Note,
}

impl From<Severity> for SarifLevel {
    fn from(s: Severity) -> Self {
        match s {
            Severity::Critical | Severity::High => SarifLevel::Error,
            Severity::Moderate => SarifLevel::Warning,
            Severity::Low | Severity::Info => SarifLevel::Note,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLocation {
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifPhysicalLocation {
    pub artifact_location: SarifArtifactLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<SarifRegion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifArtifactLocation {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRegion {
    pub start_line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_column: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
}

/// Build a SARIF 2.1.0 report with one run per engine batch.
pub fn render_sarif(batches: &[EngineBatch], ctx: &FormatContext) -> SarifReport {
    let runs = batches
        .iter()
        .map(|batch| {
            let rules = collect_rules(&batch.violations);
            let results = batch
                .violations
                .iter()
                .map(|v| to_result(v, &rules))
                .collect();
            SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: batch.engine.clone(),
                        version: ctx.tool_version.clone(),
                        rules,
                    },
                },
                results,
            }
        })
        .collect();

    SarifReport {
        schema: SARIF_SCHEMA.to_string(),
        version: SARIF_VERSION.to_string(),
        runs,
    }
}

/// Renders a SARIF report as a JSON string.
pub fn render_sarif_json(batches: &[EngineBatch], ctx: &FormatContext) -> Result<String> {
    Ok(serde_json::to_string_pretty(&render_sarif(batches, ctx))?)
}

// Rules in first-seen order so `ruleIndex` is stable.
fn collect_rules(violations: &[Violation]) -> Vec<SarifRule> {
    let mut rules: Vec<SarifRule> = Vec::new();
    for v in violations {
        if rules.iter().any(|r| r.id == v.rule) {
            continue;
        }
        rules.push(SarifRule {
            id: v.rule.clone(),
            help_uri: v.url.clone(),
            properties: v.category.as_ref().map(|category| SarifRuleProperties {
                category: category.clone(),
                severity: v.severity.value(),
            }),
        });
    }
    rules
}

fn to_result(v: &Violation, rules: &[SarifRule]) -> SarifResult {
    let rule_index = rules.iter().position(|r| r.id == v.rule).unwrap_or_default();
    SarifResult {
        rule_id: v.rule.clone(),
        rule_index,
        level: SarifLevel::from(v.severity),
        message: SarifMessage {
            text: v.message.trim().to_string(),
        },
        locations: vec![SarifLocation {
            physical_location: SarifPhysicalLocation {
                artifact_location: SarifArtifactLocation {
                    uri: v.file.replace('\\', "/"),
                },
                region: v.line.map(|start_line| SarifRegion {
                    start_line,
                    start_column: v.column,
                    end_line: v.end_line,
                    end_column: v.end_column,
                }),
            },
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::fixtures;

    #[test]
    fn test_run_per_engine() {
        let report = render_sarif(&fixtures::batches(), &FormatContext::new("sift", "1.2.3"));

        assert_eq!(report.version, "2.1.0");
        assert_eq!(report.runs.len(), 2);

        let apex = &report.runs[0];
        assert_eq!(apex.tool.driver.name, "apex");
        assert_eq!(apex.tool.driver.version, "1.2.3");
        let ids: Vec<&str> = apex.tool.driver.rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["SoqlInLoop", "Naming"]);
        assert_eq!(apex.results.len(), 3);
        assert_eq!(apex.results[2].rule_index, 1);
    }

    #[test]
    fn test_levels() {
        assert_eq!(SarifLevel::from(Severity::Critical), SarifLevel::Error);
        assert_eq!(SarifLevel::from(Severity::High), SarifLevel::Error);
        assert_eq!(SarifLevel::from(Severity::Moderate), SarifLevel::Warning);
        assert_eq!(SarifLevel::from(Severity::Low), SarifLevel::Note);
        assert_eq!(SarifLevel::from(Severity::Info), SarifLevel::Note);
    }

    #[test]
    fn test_json_field_names() {
        let json = render_sarif_json(&fixtures::batches(), &FormatContext::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["$schema"].as_str().unwrap().contains("2.1.0"));
        let result = &value["runs"][1]["results"][0];
        assert_eq!(result["ruleId"], "NoEval");
        assert_eq!(result["level"], "error");
        let location = &result["locations"][0]["physicalLocation"];
        assert_eq!(location["artifactLocation"]["uri"], "web/app.js");
        assert_eq!(location["region"]["startLine"], 7);
        assert_eq!(location["region"]["startColumn"], 5);
    }

    #[test]
    fn test_missing_line_has_no_region() {
        let mut v = fixtures::violation("apex", "a.cls", "R", 1, Severity::Low);
        v.line = None;
        let batch = EngineBatch {
            engine: "apex".to_string(),
            violations: vec![v],
        };
        let report = render_sarif(&[batch], &FormatContext::default());
        assert!(report.runs[0].results[0].locations[0]
            .physical_location
            .region
            .is_none());
    }
}
