//! Console output and exit status for `sift run`.

use crate::console::Console;
use crate::viewers::{ResultsViewer, ViewKind};
use anyhow::Result;
use sift_core::Severity;
use sift_pipeline::formats::FormatContext;
use sift_pipeline::{recombine, EngineBatch, OutputFormat};

/// Decides what a finished run prints and which status it exits with.
pub struct RunOutputProcessor<'a> {
    console: &'a dyn Console,
    format: Option<OutputFormat>,
    view: Option<ViewKind>,
    has_output_files: bool,
    threshold: Option<Severity>,
}

impl<'a> RunOutputProcessor<'a> {
    pub fn new(console: &'a dyn Console) -> Self {
        Self {
            console,
            format: None,
            view: None,
            has_output_files: false,
            threshold: None,
        }
    }

    pub fn with_format(mut self, format: Option<OutputFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn with_view(mut self, view: Option<ViewKind>) -> Self {
        self.view = view;
        self
    }

    pub fn with_output_files(mut self, has_output_files: bool) -> Self {
        self.has_output_files = has_output_files;
        self
    }

    pub fn with_threshold(mut self, threshold: Option<Severity>) -> Self {
        self.threshold = threshold;
        self
    }

    /// Print summaries and results; returns the process exit status.
    ///
    /// The status is `minSev` when a violation at or above the threshold
    /// was found, and 0 otherwise.
    pub fn process(&self, batches: &[EngineBatch], ctx: &FormatContext) -> Result<u8> {
        let console_format = self.format.unwrap_or(OutputFormat::Table);
        let results = recombine(batches, console_format, ctx)?;

        if !results.has_violations() && !self.has_output_files && !console_format.is_textual() {
            let engines: Vec<&str> = batches.iter().map(|b| b.engine.as_str()).collect();
            self.console.out(&format!(
                "Executed {}. No rule violations found.",
                engines.join(", ")
            ));
        } else {
            if console_format == OutputFormat::Table || self.has_output_files {
                for summary in &results.summary {
                    self.console.out(&format!(
                        "{}: {} violation(s) in {} file(s).",
                        summary.engine, summary.violation_count, summary.file_count
                    ));
                }
            }

            if console_format.is_textual() {
                self.console.out(results.as_text()?);
            } else {
                ResultsViewer::choose(self.view, self.has_output_files)
                    .view(self.console, batches)?;
            }
        }

        Ok(self.exit_status(results.min_sev))
    }

    fn exit_status(&self, min_sev: u8) -> u8 {
        let Some(threshold) = self.threshold else {
            return 0;
        };
        if min_sev != 0 && min_sev <= threshold.value() {
            let worst = Severity::from_value(min_sev)
                .map_or_else(|| min_sev.to_string(), Severity::detailed);
            self.console.error(&format!(
                "Found violations at or above the severity threshold {}; the most severe was {}.",
                threshold.detailed(),
                worst
            ));
            min_sev
        } else {
            0
        }
    }
}
