use crate::context::AppContext;
use crate::output::RunOutputProcessor;
use crate::viewers::ViewKind;
use crate::writers::CompositeResultsWriter;
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use sift_core::Severity;
use sift_pipeline::formats::FormatContext;
use sift_pipeline::{Dispatcher, OutputFormat, SelectionResolver, Selector, TargetResolver};
use std::path::PathBuf;
use tracing::info;

const DEFAULT_SELECTOR: &str = "Recommended";
const DEFAULT_WORKSPACE: &str = ".";

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Rules to run: engine, rule, tag, category, severity, `all` or `Recommended`.
    /// Join names with `:` to require all of them
    #[arg(short = 'r', long = "rule-selector", value_name = "SELECTOR")]
    pub rule_selector: Vec<String>,

    /// Workspace roots; targets default to these
    #[arg(short = 'w', long = "workspace", value_name = "PATH")]
    pub workspace: Vec<String>,

    /// Files, directories or globs to analyze
    #[arg(short = 't', long = "target", value_name = "PATH")]
    pub target: Vec<String>,

    /// Console format: table, csv, xml, junit, json, sarif or html
    #[arg(short = 'f', long = "format", value_name = "FORMAT")]
    pub format: Option<String>,

    /// Result files; the format comes from each extension
    #[arg(short = 'o', long = "output-file", value_name = "FILE")]
    pub output_file: Vec<PathBuf>,

    /// Exit with the most severe violation's value when it is at or above this severity
    #[arg(short = 's', long = "severity-threshold", value_name = "SEVERITY")]
    pub severity_threshold: Option<String>,

    /// Console view when no textual format is given
    #[arg(long, value_enum)]
    pub view: Option<ViewKind>,
}

impl RunArgs {
    fn selector_tokens(&self) -> Vec<String> {
        if self.rule_selector.is_empty() {
            vec![DEFAULT_SELECTOR.to_string()]
        } else {
            self.rule_selector.clone()
        }
    }

    fn workspaces(&self) -> Vec<String> {
        if self.workspace.is_empty() {
            vec![DEFAULT_WORKSPACE.to_string()]
        } else {
            self.workspace.clone()
        }
    }

    fn targets(&self) -> Vec<String> {
        if self.target.is_empty() {
            self.workspaces()
        } else {
            self.target.clone()
        }
    }
}

pub async fn execute(args: RunArgs, ctx: &AppContext) -> Result<u8> {
    // Everything the user typed is checked before any engine starts.
    let selector = Selector::parse(&args.selector_tokens())?;
    let format = args
        .format
        .as_deref()
        .map(str::parse::<OutputFormat>)
        .transpose()
        .map_err(anyhow::Error::msg)?;
    let threshold = args
        .severity_threshold
        .as_deref()
        .map(str::parse::<Severity>)
        .transpose()?;
    let writer = CompositeResultsWriter::from_paths(&args.output_file, format, ctx.events())?;

    let resolver = TargetResolver::new(ctx.fs().clone());
    let targets = args.targets();
    resolver.validate_explicit(&args.workspaces()).await?;
    resolver.validate_explicit(&targets).await?;

    let registry = ctx.build_registry().await?;
    let catalog = ctx.open_catalog(&registry).await?;
    let selection = SelectionResolver::new(&catalog).resolve(&selector, &[], ctx.events());
    info!(
        "Selected {} rule(s) across {} engine(s)",
        selection.len(),
        selection.engines().len()
    );

    let engine_targets = resolver
        .resolve_for_selection(&registry, &selection, &targets, ctx.events())
        .await
        .context("Failed to resolve targets")?;
    let batches = Dispatcher::new(&registry, ctx.events())
        .dispatch(&selection, &engine_targets)
        .await?;

    let format_ctx = FormatContext::default().with_timestamp(Utc::now());
    writer.write(ctx.fs().as_ref(), &batches, &format_ctx).await?;

    RunOutputProcessor::new(ctx.console())
        .with_format(format)
        .with_view(args.view)
        .with_output_files(!writer.is_empty())
        .with_threshold(threshold)
        .process(&batches, &format_ctx)
}
