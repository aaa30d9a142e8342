//! CSV output (RFC 4180).

use super::all_violations;
use crate::dispatcher::EngineBatch;
use sift_core::Violation;

/// CSV header row.
pub const CSV_HEADER: &str =
    "Problem,Severity,File,Line,Column,Rule,Description,URL,Category,Engine";

/// One row per violation, numbered from 1 in dispatch order.
pub fn render_csv(batches: &[EngineBatch]) -> String {
    let mut out = String::new();
    out.push_str(CSV_HEADER);
    out.push('\n');

    for (index, violation) in all_violations(batches).enumerate() {
        out.push_str(&render_csv_row(index + 1, violation));
    }

    out
}

fn render_csv_row(problem: usize, v: &Violation) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{},{}\n",
        problem,
        v.severity.value(),
        escape_csv_field(&v.file),
        optional_number(v.line),
        optional_number(v.column),
        escape_csv_field(&v.rule),
        escape_csv_field(&v.message),
        escape_csv_field(v.url.as_deref().unwrap_or_default()),
        escape_csv_field(v.category.as_deref().unwrap_or_default()),
        escape_csv_field(&v.engine),
    )
}

fn optional_number(value: Option<u32>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}

/// Fields containing commas, double quotes or newlines are quoted, with
/// embedded quotes doubled.
pub fn escape_csv_field(s: &str) -> String {
    let needs_quoting = s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r');

    if needs_quoting {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
