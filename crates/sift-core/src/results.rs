//! The terminal artifact of a run.

use crate::error::{Error, Result};
use crate::types::Severity;
use serde::Serialize;

/// Per-engine counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSummary {
    pub engine: String,
    pub violation_count: usize,
    /// Distinct files with at least one violation.
    pub file_count: usize,
}

/// A rendered result body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecombinedData {
    /// Textual encodings (CSV, XML, JUnit, JSON, SARIF, HTML).
    Text(String),
    /// Tabular display; never serialized to a file.
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl RecombinedData {
    fn shape(&self) -> &'static str {
        match self {
            RecombinedData::Text(_) => "text",
            RecombinedData::Table { .. } => "table",
        }
    }
}

/// Merged results of every engine for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecombinedRuleResults {
    /// Lowest severity value observed, or 0 when there were no violations.
    pub min_sev: u8,
    /// One entry per dispatched engine, in dispatch order.
    pub summary: Vec<EngineSummary>,
    pub results: RecombinedData,
}

impl RecombinedRuleResults {
    pub fn total_violations(&self) -> usize {
        self.summary.iter().map(|s| s.violation_count).sum()
    }

    pub fn has_violations(&self) -> bool {
        self.min_sev != 0
    }

    /// Severity corresponding to `min_sev`, if any violation was found.
    pub fn min_severity(&self) -> Option<Severity> {
        Severity::from_value(self.min_sev)
    }

    /// The textual body; a table body here is an internal contract error.
    pub fn as_text(&self) -> Result<&str> {
        match &self.results {
            RecombinedData::Text(text) => Ok(text),
            other => Err(Error::FormatMismatch {
                expected: "text",
                actual: other.shape(),
            }),
        }
    }

    /// The tabular body; a text body here is an internal contract error.
    pub fn as_table(&self) -> Result<(&[String], &[Vec<String>])> {
        match &self.results {
            RecombinedData::Table { columns, rows } => Ok((columns, rows)),
            other => Err(Error::FormatMismatch {
                expected: "table",
                actual: other.shape(),
            }),
        }
    }
}
