//! Build command implementation.

use crate::builder::{BuildResult, Builder};
use crate::cli::OutputManager;
use crate::config::{DistribConfig, EnvConfig};
use crate::error::Result;

/// Execute build command
pub(super) async fn execute_build(
    config: DistribConfig,
    env: EnvConfig,
    output: &OutputManager,
) -> Result<i32> {
    let result = run_build(config, env, output).await?;
    Ok(if result.succeeded { 0 } else { 1 })
}

/// Build and report, shared with the release command
pub(super) async fn run_build(
    config: DistribConfig,
    env: EnvConfig,
    output: &OutputManager,
) -> Result<BuildResult> {
    output.section("Build")?;
    output.info(&format!(
        "Building {} from {}",
        config.project,
        config.root_dir.display()
    ))?;

    let result = Builder::new(config, env).build().await?;

    if result.succeeded {
        output.success(&format!("Built version {}", result.version))?;
        if let Some(artifacts) = &result.artifacts {
            output.indent(&artifacts.archive.display().to_string())?;
            output.indent(&artifacts.checksum.display().to_string())?;
        }
    } else {
        let code = result
            .exit_code
            .map_or_else(|| "none (killed by signal)".to_string(), |c| c.to_string());
        output.error(&format!("Packaging toolchain failed, exit code {code}"));
    }
    Ok(result)
}
