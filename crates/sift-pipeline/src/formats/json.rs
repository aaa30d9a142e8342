//! JSON output: violations grouped by engine and file.

use super::group_by_engine_and_file;
use crate::dispatcher::EngineBatch;
use serde::{Deserialize, Serialize};
use sift_core::{Result, Violation};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonFileResult {
    pub engine: String,
    pub file_name: String,
    pub violations: Vec<JsonViolation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonViolation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
    pub severity: u8,
    pub rule_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub message: String,
}

impl From<&Violation> for JsonViolation {
    fn from(v: &Violation) -> Self {
        Self {
            line: v.line,
            column: v.column,
            end_line: v.end_line,
            end_column: v.end_column,
            severity: v.severity.value(),
            rule_name: v.rule.clone(),
            category: v.category.clone(),
            url: v.url.clone(),
            message: v.message.trim().to_string(),
        }
    }
}

/// Pretty-printed array of per-file results.
pub fn render_json(batches: &[EngineBatch]) -> Result<String> {
    let results: Vec<JsonFileResult> = group_by_engine_and_file(batches)
        .into_iter()
        .map(|group| JsonFileResult {
            engine: group.engine.to_string(),
            file_name: group.file.to_string(),
            violations: group.violations.into_iter().map(JsonViolation::from).collect(),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&results)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::fixtures;

    #[test]
    fn test_shape() {
        let json = render_json(&fixtures::batches()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let files = value.as_array().unwrap();
        assert_eq!(files.len(), 3);
        assert_eq!(files[0]["engine"], "apex");
        assert_eq!(files[0]["fileName"], "src/A.cls");
        assert_eq!(files[0]["violations"][0]["ruleName"], "SoqlInLoop");
        assert_eq!(files[0]["violations"][0]["severity"], 2);
        assert_eq!(files[0]["violations"][0]["endColumn"], 12);
        assert_eq!(files[0]["violations"][1]["line"], 22);
    }

    #[test]
    fn test_empty_is_empty_array() {
        assert_eq!(render_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_absent_location_fields_are_omitted() {
        let mut v = fixtures::violation("apex", "a.cls", "R", 1, sift_core::Severity::Low);
        v.line = None;
        v.column = None;
        let batch = EngineBatch {
            engine: "apex".to_string(),
            violations: vec![v],
        };
        let json = render_json(&[batch]).unwrap();
        assert!(!json.contains("\"line\""));
        assert!(!json.contains("\"column\""));
        assert!(json.contains("\"endLine\""));
    }
}
