//! Sift - run static-analysis rule engines and merge their results.

use anyhow::{Context, Result};
use clap::Parser;
use sift_cli::commands::{self, Command};
use sift_cli::{logging, AppContext, Console, TerminalConsole};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(
    version,
    about = "Run static-analysis rule engines and merge their results",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose diagnostics on stderr (repeat for more)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let console: Arc<dyn Console> = Arc::new(TerminalConsole::new());
    match run(cli, console.clone()) {
        Ok(status) => ExitCode::from(status),
        Err(err) => {
            report(console.as_ref(), &err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, console: Arc<dyn Console>) -> Result<u8> {
    let runtime = Runtime::new().context("Failed to create tokio runtime")?;

    runtime.block_on(async {
        let ctx = AppContext::from_env(cli.config.as_deref(), console).await?;
        commands::execute(cli.command, &ctx).await
    })
}

fn report(console: &dyn Console, err: &anyhow::Error) {
    let internal = err
        .downcast_ref::<sift_core::Error>()
        .is_some_and(sift_core::Error::is_internal);
    if internal {
        console.error(&format!("An unexpected internal error occurred: {}", err));
    } else {
        console.error(&err.to_string());
    }
    for cause in err.chain().skip(1) {
        console.error(&format!("  caused by: {}", cause));
    }
}
