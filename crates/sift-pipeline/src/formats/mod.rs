//! Result encodings.
//!
//! Every renderer takes the engine batches in dispatch order and never
//! reorders violations beyond the grouping its encoding calls for. Output
//! is deterministic for a fixed input; the HTML timestamp is the only
//! wall-clock content and comes from [`FormatContext`].

mod csv;
mod html;
mod json;
mod junit;
mod sarif;
mod table;
mod xml;

pub use csv::{escape_csv_field, render_csv, CSV_HEADER};
pub use html::render_html;
pub use json::{render_json, JsonFileResult, JsonViolation};
pub use junit::render_junit;
pub use sarif::{render_sarif, render_sarif_json, SarifReport};
pub use table::{location, render_table, TABLE_COLUMNS};
pub use xml::render_xml;

use crate::dispatcher::EngineBatch;
use chrono::{DateTime, Utc};
use sift_core::{Error, RecombinedData, Result, Violation};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported result encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Table,
    Csv,
    Xml,
    Junit,
    Json,
    Sarif,
    Html,
}

/// Extensions accepted for result files, as shown in errors.
pub const RESULT_FILE_EXTENSIONS: &str =
    ".csv, .xml, .junit, .json, .sarif, .sarif.json, .html, .htm";

impl OutputFormat {
    pub fn all() -> &'static [OutputFormat] {
        &[
            OutputFormat::Table,
            OutputFormat::Csv,
            OutputFormat::Xml,
            OutputFormat::Junit,
            OutputFormat::Json,
            OutputFormat::Sarif,
            OutputFormat::Html,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Csv => "csv",
            OutputFormat::Xml => "xml",
            OutputFormat::Junit => "junit",
            OutputFormat::Json => "json",
            OutputFormat::Sarif => "sarif",
            OutputFormat::Html => "html",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Infer a format from a file name.
    ///
    /// `.sarif.json` is checked before the generic `.json`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let lower = path.to_string_lossy().to_ascii_lowercase();
        let format = if lower.ends_with(".sarif") || lower.ends_with(".sarif.json") {
            Some(OutputFormat::Sarif)
        } else if lower.ends_with(".json") {
            Some(OutputFormat::Json)
        } else if lower.ends_with(".csv") {
            Some(OutputFormat::Csv)
        } else if lower.ends_with(".xml") {
            Some(OutputFormat::Xml)
        } else if lower.ends_with(".junit") {
            Some(OutputFormat::Junit)
        } else if lower.ends_with(".html") || lower.ends_with(".htm") {
            Some(OutputFormat::Html)
        } else {
            None
        };

        format.ok_or_else(|| Error::UnsupportedOutputFile {
            path: path.to_path_buf(),
            supported: RESULT_FILE_EXTENSIONS.to_string(),
        })
    }

    /// Whether the encoding is a single string that can be written to a file.
    pub fn is_textual(self) -> bool {
        self != OutputFormat::Table
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            let names: Vec<&str> = Self::all().iter().map(|f| f.name()).collect();
            format!("unknown format '{}'; expected one of {}", s, names.join(", "))
        })
    }
}

/// Tool identity and the optional timestamp recorded by formats that carry one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatContext {
    pub tool_name: String,
    pub tool_version: String,
    pub generated_at: Option<DateTime<Utc>>,
}

impl FormatContext {
    pub fn new(tool_name: impl Into<String>, tool_version: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_version: tool_version.into(),
            generated_at: None,
        }
    }

    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }
}

impl Default for FormatContext {
    fn default() -> Self {
        Self::new("sift", env!("CARGO_PKG_VERSION"))
    }
}

/// Encode `batches` in `format`.
pub fn render(
    format: OutputFormat,
    batches: &[EngineBatch],
    ctx: &FormatContext,
) -> Result<RecombinedData> {
    let data = match format {
        OutputFormat::Table => {
            let (columns, rows) = render_table(batches);
            RecombinedData::Table { columns, rows }
        }
        OutputFormat::Csv => RecombinedData::Text(render_csv(batches)),
        OutputFormat::Xml => RecombinedData::Text(render_xml(batches)),
        OutputFormat::Junit => RecombinedData::Text(render_junit(batches, ctx)),
        OutputFormat::Json => RecombinedData::Text(render_json(batches)?),
        OutputFormat::Sarif => RecombinedData::Text(render_sarif_json(batches, ctx)?),
        OutputFormat::Html => RecombinedData::Text(render_html(batches, ctx)),
    };
    Ok(data)
}

/// Violations of one file reported by one engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileGroup<'a> {
    pub engine: &'a str,
    pub file: &'a str,
    pub violations: Vec<&'a Violation>,
}

/// Group violations by `(engine, file)` in first-seen order.
pub fn group_by_engine_and_file(batches: &[EngineBatch]) -> Vec<FileGroup<'_>> {
    let mut groups: Vec<FileGroup<'_>> = Vec::new();
    for batch in batches {
        // Earlier engines' groups are never revisited.
        let mut by_file: HashMap<&str, usize> = HashMap::new();
        for violation in &batch.violations {
            match by_file.get(violation.file.as_str()) {
                Some(&index) => groups[index].violations.push(violation),
                None => {
                    by_file.insert(&violation.file, groups.len());
                    groups.push(FileGroup {
                        engine: &batch.engine,
                        file: &violation.file,
                        violations: vec![violation],
                    });
                }
            }
        }
    }
    groups
}

pub(crate) fn all_violations(batches: &[EngineBatch]) -> impl Iterator<Item = &Violation> {
    batches.iter().flat_map(|b| b.violations.iter())
}

/// Escapes special XML characters in a string.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Parsers normalize a raw CR away.
            '\r' => out.push_str("&#13;"),
            '\t' | '\n' => out.push(c),
            // Not representable in XML 1.0, even as a character reference.
            c if (c as u32) < 0x20 => out.push(char::REPLACEMENT_CHARACTER),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use sift_core::Severity;

    pub fn violation(
        engine: &str,
        file: &str,
        rule: &str,
        line: u32,
        severity: Severity,
    ) -> Violation {
        Violation {
            rule: rule.to_string(),
            engine: engine.to_string(),
            severity,
            file: file.to_string(),
            line: Some(line),
            column: Some(5),
            end_line: Some(line),
            end_column: Some(12),
            message: format!("{} triggered", rule),
            category: Some("Best Practices".to_string()),
            url: Some(format!("https://example.com/rules/{}", rule)),
        }
    }

    pub fn batches() -> Vec<EngineBatch> {
        vec![
            EngineBatch {
                engine: "apex".to_string(),
                violations: vec![
                    violation("apex", "src/A.cls", "SoqlInLoop", 10, Severity::High),
                    violation("apex", "src/B.cls", "Naming", 3, Severity::Low),
                    violation("apex", "src/A.cls", "Naming", 22, Severity::Low),
                ],
            },
            EngineBatch {
                engine: "javascript".to_string(),
                violations: vec![violation(
                    "javascript",
                    "web/app.js",
                    "NoEval",
                    7,
                    Severity::Critical,
                )],
            },
        ]
    }
}
