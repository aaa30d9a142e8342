use crate::context::AppContext;
use crate::viewers::{RuleViewer, ViewKind};
use crate::writers::RulesWriter;
use anyhow::Result;
use clap::Args;
use sift_core::Rule;
use sift_pipeline::{RuleFilter, SelectionResolver, Selector};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct RulesArgs {
    /// Rules to list; without one, the filters alone decide and with no
    /// filters either, the default-enabled rules are listed
    #[arg(short = 'r', long = "rule-selector", value_name = "SELECTOR")]
    pub rule_selector: Vec<String>,

    /// Only rules in this category
    #[arg(long, value_name = "CATEGORY")]
    pub category: Vec<String>,

    /// Only rules in this ruleset
    #[arg(long, value_name = "RULESET")]
    pub ruleset: Vec<String>,

    /// Only rules for this language
    #[arg(long, value_name = "LANGUAGE")]
    pub language: Vec<String>,

    /// Only rules from this engine
    #[arg(long, value_name = "ENGINE")]
    pub engine: Vec<String>,

    #[arg(long, value_enum)]
    pub view: Option<ViewKind>,

    /// Write the listing to a .json or .csv file
    #[arg(short = 'o', long = "output-file", value_name = "FILE")]
    pub output_file: Option<PathBuf>,
}

impl RulesArgs {
    fn filters(&self) -> Vec<RuleFilter> {
        let mut filters = Vec::new();
        if !self.category.is_empty() {
            filters.push(RuleFilter::Category(self.category.clone()));
        }
        if !self.ruleset.is_empty() {
            filters.push(RuleFilter::Ruleset(self.ruleset.clone()));
        }
        if !self.language.is_empty() {
            filters.push(RuleFilter::Language(self.language.clone()));
        }
        if !self.engine.is_empty() {
            filters.push(RuleFilter::Engine(self.engine.clone()));
        }
        filters
    }
}

pub async fn execute(args: RulesArgs, ctx: &AppContext) -> Result<()> {
    let writer = args
        .output_file
        .as_deref()
        .map(RulesWriter::from_path)
        .transpose()?;
    let selector = if args.rule_selector.is_empty() {
        None
    } else {
        Some(Selector::parse(&args.rule_selector)?)
    };

    let registry = ctx.build_registry().await?;
    let catalog = ctx.open_catalog(&registry).await?;
    let filters = args.filters();
    // Without a selector, filters alone pick the rules; with neither, the
    // default-enabled rules are listed.
    let listed: Vec<Rule> = match &selector {
        Some(selector) => SelectionResolver::new(&catalog)
            .resolve(selector, &filters, ctx.events())
            .rules()
            .cloned()
            .collect(),
        None => catalog.rules_matching(&filters).into_iter().cloned().collect(),
    };
    let rules: Vec<&Rule> = listed.iter().collect();

    RuleViewer::choose(args.view, writer.is_some()).view(ctx.console(), &rules);

    if let Some(writer) = writer {
        writer.write(ctx.fs().as_ref(), &rules).await?;
        ctx.console().out(&format!(
            "Wrote {} rule(s) to {}.",
            rules.len(),
            writer.path().display()
        ));
    }
    Ok(())
}
