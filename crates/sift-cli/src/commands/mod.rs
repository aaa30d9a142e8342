//! Subcommands.

pub mod config;
pub mod custom_rules;
pub mod rules;
pub mod run;

use crate::context::AppContext;
use anyhow::Result;
use clap::Subcommand;

pub use config::ConfigArgs;
pub use custom_rules::CustomRulesCommand;
pub use rules::RulesArgs;
pub use run::RunArgs;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the selected rules against the targets
    Run(RunArgs),

    /// List the rules a selector would run
    Rules(RulesArgs),

    /// Print the effective configuration for the selected rules
    Config(ConfigArgs),

    /// Manage custom rule files
    CustomRules {
        #[command(subcommand)]
        command: CustomRulesCommand,
    },
}

/// Execute `command`, returning the process exit status.
///
/// Event listeners stay attached for the whole command, including when it fails.
pub async fn execute(command: Command, ctx: &AppContext) -> Result<u8> {
    let listeners = match command {
        Command::CustomRules { .. } => Vec::new(),
        _ => ctx.attach_listeners()?,
    };

    let status = match command {
        Command::Run(args) => run::execute(args, ctx).await,
        Command::Rules(args) => rules::execute(args, ctx).await.map(|_| 0),
        Command::Config(args) => config::execute(args, ctx).await.map(|_| 0),
        Command::CustomRules { command } => custom_rules::execute(command, ctx).await.map(|_| 0),
    };

    ctx.detach_listeners(listeners);
    status
}
