use crate::context::AppContext;
use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug, Clone)]
pub enum CustomRulesCommand {
    /// Register rule files, or every file directly inside a directory
    Add {
        /// Engine that loads the rules
        #[arg(long)]
        engine: String,

        /// Language the rules apply to
        #[arg(long)]
        language: String,

        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
    },

    /// Show registered rule files
    List,
}

pub async fn execute(command: CustomRulesCommand, ctx: &AppContext) -> Result<()> {
    match command {
        CustomRulesCommand::Add {
            engine,
            language,
            paths,
        } => add(ctx, &engine, &language, &paths).await,
        CustomRulesCommand::List => list(ctx).await,
    }
}

async fn add(ctx: &AppContext, engine: &str, language: &str, paths: &[PathBuf]) -> Result<()> {
    if ctx.config().engine(engine).is_none() {
        ctx.console().warn(&format!(
            "No engine named '{}' is configured; the rules will load once one is.",
            engine
        ));
    }

    let mut registry = ctx.custom_paths().await?;
    let added = registry
        .add(engine, language, paths)
        .await
        .with_context(|| format!("Failed to register custom rules for {}", engine))?;
    registry
        .save()
        .await
        .context("Failed to save custom rule paths")?;

    if added.is_empty() {
        ctx.console().out("No new custom rule files were registered.");
    } else {
        ctx.console().out(&format!(
            "Registered {} custom rule file(s) for {}/{}:",
            added.len(),
            engine,
            language
        ));
        for path in added {
            ctx.console().out(&format!("    {}", path));
        }
    }
    Ok(())
}

async fn list(ctx: &AppContext) -> Result<()> {
    let registry = ctx.custom_paths().await?;
    if registry.is_empty() {
        ctx.console().out("No custom rule files are registered.");
        return Ok(());
    }

    for (engine, languages) in registry.entries() {
        ctx.console().out(&format!("{}:", engine));
        for (language, paths) in languages {
            ctx.console().out(&format!("  {}:", language));
            for path in paths {
                ctx.console().out(&format!("    {}", path));
            }
        }
    }
    Ok(())
}
