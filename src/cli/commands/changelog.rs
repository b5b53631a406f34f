//! Changelog command implementation.

use crate::artifacts::ArtifactSet;
use crate::changelog::read_changelog;
use crate::cli::OutputManager;
use crate::config::DistribConfig;
use crate::error::Result;

/// Print the changelog excerpt that `publish` would use as release description
pub(super) fn execute_changelog(
    config: DistribConfig,
    version: &str,
    output: &OutputManager,
) -> Result<i32> {
    let changes = ArtifactSet::new(&config, version).changes;
    let text = read_changelog(&changes, &config.project, version)?;
    if text.is_empty() {
        output.warn(&format!(
            "No changelog entry for {} {} in {}",
            config.project,
            version,
            changes.display()
        ))?;
        return Ok(1);
    }
    output.println(&text)?;
    Ok(0)
}
