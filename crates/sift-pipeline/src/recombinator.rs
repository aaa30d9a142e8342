//! Merges engine batches into one result set.

use crate::dispatcher::EngineBatch;
use crate::formats::{render, FormatContext, OutputFormat};
use sift_core::{EngineSummary, RecombinedRuleResults, Result};
use std::collections::HashSet;
use tracing::debug;

/// Compute the severity floor and per-engine summary, then encode.
///
/// `min_sev` is 0 when there are no violations. Summary entries follow
/// batch order and include engines that reported nothing.
pub fn recombine(
    batches: &[EngineBatch],
    format: OutputFormat,
    ctx: &FormatContext,
) -> Result<RecombinedRuleResults> {
    let min_sev = batches
        .iter()
        .flat_map(|b| b.violations.iter())
        .map(|v| v.severity.value())
        .min()
        .unwrap_or(0);

    let summary = batches.iter().map(summarize).collect();
    let results = render(format, batches, ctx)?;

    debug!("Recombined {} batch(es) as {}", batches.len(), format);

    Ok(RecombinedRuleResults {
        min_sev,
        summary,
        results,
    })
}

fn summarize(batch: &EngineBatch) -> EngineSummary {
    let files: HashSet<&str> = batch.violations.iter().map(|v| v.file.as_str()).collect();
    EngineSummary {
        engine: batch.engine.clone(),
        violation_count: batch.violations.len(),
        file_count: files.len(),
    }
}
