//! Changelog handling for debian/changelog and debuild `.changes` files.

use crate::error::BuildError;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Marker line closing the `Changes:` section of a `.changes` file
pub const CHECKSUMS_MARKER: &str = "Checksums-Sha1:";

/// Extract the changelog block of `version` from `.changes` file content.
///
/// Keeps the lines strictly between the first line containing
/// `"<project> (<version>)"` and the next line containing [`CHECKSUMS_MARKER`],
/// trimmed and joined by `\n`. Debian's lone `.` blank-line placeholders are
/// dropped. Returns an empty string when the version header is absent.
pub fn extract_changelog(content: &str, project: &str, version: &str) -> String {
    let header = format!("{project} ({version})");
    content
        .lines()
        .skip_while(|line| !line.contains(&header))
        .skip(1)
        .take_while(|line| !line.contains(CHECKSUMS_MARKER))
        .map(str::trim)
        .filter(|line| *line != ".")
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read the `.changes` file and extract the block of `version`
pub fn read_changelog(changes: &Path, project: &str, version: &str) -> std::io::Result<String> {
    let content = std::fs::read_to_string(changes)?;
    Ok(extract_changelog(&content, project, version))
}

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\S+\s+\(([^()\s]+)\)").expect("changelog header regex is valid")
});

/// Version of the newest entry of a debian/changelog
pub fn debian_version(changelog: &Path) -> Result<String, BuildError> {
    let content =
        std::fs::read_to_string(changelog).map_err(|e| BuildError::ChangelogUnreadable {
            path: changelog.to_path_buf(),
            reason: e.to_string(),
        })?;
    let first = content.lines().next().unwrap_or_default();
    HEADER_RE
        .captures(first)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| BuildError::ChangelogUnreadable {
            path: changelog.to_path_buf(),
            reason: format!("unexpected header line '{first}'"),
        })
}

/// Ensure `version` appears on exactly one line of `source_file`
pub fn check_source_version(version: &str, source_file: &Path) -> Result<(), BuildError> {
    let content =
        std::fs::read_to_string(source_file).map_err(|source| BuildError::Io {
            operation: "Unable to read",
            path: source_file.to_path_buf(),
            source,
        })?;
    let occurrences = content.lines().filter(|line| line.contains(version)).count();
    if occurrences != 1 {
        return Err(BuildError::VersionMismatch {
            version: version.to_string(),
            source_file: source_file.to_path_buf(),
            occurrences,
        });
    }
    Ok(())
}
