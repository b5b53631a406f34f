//! Publish command implementation.

use crate::cli::OutputManager;
use crate::config::{DistribConfig, EnvConfig};
use crate::error::Result;
use crate::publish::{PublishReport, Publisher};

/// Execute publish command
pub(super) async fn execute_publish(
    config: DistribConfig,
    env: &EnvConfig,
    version: &str,
    output: &OutputManager,
) -> Result<i32> {
    output.section("Publish")?;
    let publisher = Publisher::github(config, env)?;
    let report = publisher.publish(version).await?;
    print_report(&report, output)?;
    Ok(0)
}

fn print_report(report: &PublishReport, output: &OutputManager) -> Result<()> {
    if let Some(replaced) = &report.replaced {
        output.warn(&format!(
            "Replaced previous release {} ({})",
            replaced.title, replaced.tag_name
        ))?;
    }
    output.success(&format!(
        "Published pre-release {} ({})",
        report.release.title, report.release.tag_name
    ))?;
    if let Some(url) = &report.release.html_url {
        output.indent(url)?;
    }
    for asset in &report.assets {
        output.indent(&format!("✓ {} ({} bytes)", asset.name, asset.size))?;
    }
    Ok(())
}
