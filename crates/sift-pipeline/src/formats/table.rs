//! Tabular console output.

use super::all_violations;
use crate::dispatcher::EngineBatch;
use sift_core::Violation;

pub const TABLE_COLUMNS: &[&str] = &[
    "#", "Severity", "File", "Location", "Rule", "Engine", "Message",
];

/// Column names and one row of cells per violation.
pub fn render_table(batches: &[EngineBatch]) -> (Vec<String>, Vec<Vec<String>>) {
    let columns = TABLE_COLUMNS.iter().map(|c| c.to_string()).collect();
    let rows = all_violations(batches)
        .enumerate()
        .map(|(index, v)| {
            vec![
                (index + 1).to_string(),
                v.severity.display_name().to_string(),
                v.file.clone(),
                location(v),
                v.rule.clone(),
                v.engine.clone(),
                v.message.trim().to_string(),
            ]
        })
        .collect();
    (columns, rows)
}

/// `line:column`, `line`, or empty.
pub fn location(v: &Violation) -> String {
    match (v.line, v.column) {
        (Some(line), Some(column)) => format!("{}:{}", line, column),
        (Some(line), None) => line.to_string(),
        _ => String::new(),
    }
}
