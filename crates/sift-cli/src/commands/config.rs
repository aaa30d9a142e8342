use crate::context::AppContext;
use crate::writers::ConfigWriter;
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use sift_config::SiftConfig;
use sift_core::RuleSelection;
use sift_pipeline::{SelectionResolver, Selector};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Rules to include; defaults to `all`
    #[arg(short = 'r', long = "rule-selector", value_name = "SELECTOR")]
    pub rule_selector: Vec<String>,

    /// Write the configuration to a .yaml or .yml file
    #[arg(short = 'o', long = "output-file", value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Overwrite the output file without asking
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
pub struct EffectiveConfig {
    pub version: String,
    pub engines: Vec<EffectiveEngine>,
}

#[derive(Debug, Serialize)]
pub struct EffectiveEngine {
    pub name: String,
    pub kind: String,
    pub disabled: bool,
    pub target_patterns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builtin: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub rules: BTreeMap<String, RuleSettings>,
}

#[derive(Debug, Serialize)]
pub struct RuleSettings {
    pub severity: u8,
    pub tags: Vec<String>,
}

/// Engine settings from `config`, each with the selected rules it owns.
pub fn effective_config(config: &SiftConfig, selection: &RuleSelection) -> EffectiveConfig {
    let engines = config
        .engines
        .iter()
        .map(|settings| {
            let rules = selection
                .for_engine(&settings.name)
                .map(|partition| {
                    partition
                        .rules
                        .iter()
                        .map(|rule| {
                            (
                                rule.name.clone(),
                                RuleSettings {
                                    severity: rule.severity.value(),
                                    tags: rule.tags.clone(),
                                },
                            )
                        })
                        .collect()
                })
                .unwrap_or_default();

            EffectiveEngine {
                name: settings.name.clone(),
                kind: settings.kind.clone(),
                disabled: settings.disabled,
                target_patterns: settings.target_patterns.clone(),
                builtin: settings.builtin.clone(),
                rules,
            }
        })
        .collect();

    EffectiveConfig {
        version: config.version.clone(),
        engines,
    }
}

pub async fn execute(args: ConfigArgs, ctx: &AppContext) -> Result<()> {
    let writer = args
        .output_file
        .as_deref()
        .map(|path| ConfigWriter::from_path(path, args.yes))
        .transpose()?;
    let tokens = if args.rule_selector.is_empty() {
        vec!["all".to_string()]
    } else {
        args.rule_selector.clone()
    };
    let selector = Selector::parse(&tokens)?;

    let registry = ctx.build_registry().await?;
    let catalog = ctx.open_catalog(&registry).await?;
    let selection = SelectionResolver::new(&catalog).resolve(&selector, &[], ctx.events());

    let effective = effective_config(ctx.config(), &selection);
    let yaml = serde_yaml::to_string(&effective).context("Failed to encode configuration")?;

    match writer {
        Some(writer) => {
            writer.write(ctx.fs().as_ref(), ctx.console(), &yaml).await?;
            ctx.console()
                .out(&format!("Wrote configuration to {}.", writer.path().display()));
        }
        None => ctx.console().out(yaml.trim_end()),
    }
    Ok(())
}
