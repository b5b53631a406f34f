//! Command execution for the build and publish workflow.

mod build;
mod changelog;
mod publish;
mod release;

use crate::cli::{Args, Command, OutputManager};
use crate::config::EnvConfig;
use crate::error::Result;

use build::execute_build;
use changelog::execute_changelog;
use publish::execute_publish;
use release::execute_release;

/// Execute the parsed command and return the process exit code
pub async fn execute_command(args: Args) -> Result<i32> {
    let output = OutputManager::new(args.quiet);
    let config = args.distrib_config()?;
    let env = EnvConfig::from_env();

    log::debug!("Running '{}' with {:?}", args.command.name(), config);

    match &args.command {
        Command::Build => execute_build(config, env, &output).await,
        Command::Publish { version } => execute_publish(config, &env, version, &output).await,
        Command::Changelog { version } => execute_changelog(config, version, &output),
        Command::Release { version } => {
            execute_release(config, env, version.as_deref(), &output).await
        }
    }
}
