//! Error types for build and publish operations.
//!
//! Every failure cause keeps its own variant so callers can branch on it
//! instead of re-reading the log.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cleep_distrib operations
pub type Result<T> = std::result::Result<T, DistribError>;

/// Main error type for all cleep_distrib operations
#[derive(Error, Debug)]
pub enum DistribError {
    /// Package build errors
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Release publishing errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Hosting service errors raised outside of a publish run
    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while building the package archive
#[derive(Error, Debug)]
pub enum BuildError {
    /// Error-reporting secret missing from the environment
    #[error("{var} is not defined, please set it with a valid Sentry DSN")]
    MissingSecret {
        /// Environment variable name
        var: String,
    },

    /// debian/changelog and the project sources disagree on the version
    #[error(
        "version {version} from debian/changelog found {occurrences} time(s) in {}, expected exactly once",
        source_file.display()
    )]
    VersionMismatch {
        /// Version read from debian/changelog
        version: String,
        /// File expected to declare the version
        source_file: PathBuf,
        /// Matching lines found
        occurrences: usize,
    },

    /// debian/changelog missing or without a parsable header
    #[error("Unable to read version from {}: {reason}", path.display())]
    ChangelogUnreadable {
        /// Path to debian/changelog
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Packaging toolchain could not be started
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        /// Command line
        command: String,
        /// Spawn error
        #[source]
        source: std::io::Error,
    },

    /// Toolchain finished but no .deb was produced
    #[error("No {pattern} package found in {}", dir.display())]
    PackageNotFound {
        /// Searched directory
        dir: PathBuf,
        /// Searched file pattern
        pattern: String,
    },

    /// Zip archive creation failed
    #[error("Failed to create archive {}: {source}", path.display())]
    Archive {
        /// Archive path
        path: PathBuf,
        /// Zip error
        #[source]
        source: zip::result::ZipError,
    },

    /// Filesystem operation failed
    #[error("{operation} {}: {source}", path.display())]
    Io {
        /// Operation being performed
        operation: &'static str,
        /// Path involved
        path: PathBuf,
        /// IO error
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while publishing a release
#[derive(Error, Debug)]
pub enum PublishError {
    /// Version string cannot name a release
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion {
        /// Version string
        version: String,
        /// Reason for the error
        reason: String,
    },

    /// Archive and/or checksum not built
    #[error("Missing build artifacts: {}", display_paths(paths))]
    MissingArtifacts {
        /// Missing files
        paths: Vec<PathBuf>,
    },

    /// Stale release could not be deleted
    #[error("Failed to delete existing release '{title}': {source}")]
    ReleaseDeletion {
        /// Release title
        title: String,
        /// Hosting error
        #[source]
        source: GitHubError,
    },

    /// Tag of the stale release could not be deleted
    #[error("Failed to delete tag '{tag}'")]
    TagDeletion {
        /// Tag name
        tag: String,
    },

    /// New release could not be created
    #[error("Failed to create release '{title}': {source}")]
    ReleaseCreation {
        /// Release title
        title: String,
        /// Hosting error
        #[source]
        source: GitHubError,
    },

    /// Asset upload failed
    #[error("Failed to upload asset {}: {source}", path.display())]
    AssetUpload {
        /// Asset file
        path: PathBuf,
        /// Hosting error
        #[source]
        source: GitHubError,
    },
}

/// Errors from the hosting service client
#[derive(Error, Debug)]
pub enum GitHubError {
    /// Access token missing from the environment
    #[error("{var} is not defined, please set it with a GitHub access token")]
    MissingToken {
        /// Environment variable name
        var: String,
    },

    /// Transport or decoding failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Unexpected status code
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        /// HTTP method
        method: String,
        /// Request URL
        url: String,
        /// Response status
        status: u16,
        /// Response body
        body: String,
    },

    /// Release has no upload URL
    #[error("Release {id} has no upload URL")]
    NoUploadUrl {
        /// Release id
        id: u64,
    },

    /// Configured API base or returned upload URL is not a usable URL
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// Offending URL
        url: String,
        /// Parse failure
        reason: String,
    },

    /// Local file could not be read
    #[error("Unable to read {}: {source}", path.display())]
    Io {
        /// File path
        path: PathBuf,
        /// IO error
        #[source]
        source: std::io::Error,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Unable to read config file {}: {source}", path.display())]
    Read {
        /// Config path
        path: PathBuf,
        /// IO error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML
    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        /// Config path
        path: PathBuf,
        /// TOML error
        #[source]
        source: toml::de::Error,
    },

    /// Invalid value
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: &'static str,
        /// Reason for the error
        reason: String,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl DistribError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            DistribError::Build(BuildError::MissingSecret { var }) => vec![
                format!("Export the Sentry DSN before building: export {var}=<dsn>"),
            ],
            DistribError::Build(BuildError::VersionMismatch { version, source_file, .. }) => vec![
                format!(
                    "Update __version__ in {} to {version}",
                    source_file.display()
                ),
                "Or add a new debian/changelog entry matching the source version".to_string(),
            ],
            DistribError::Publish(PublishError::MissingArtifacts { .. }) => vec![
                "Run 'cleep_distrib build' before publishing".to_string(),
                "Check that the version matches the one in debian/changelog".to_string(),
            ],
            DistribError::GitHub(GitHubError::MissingToken { var }) => vec![format!(
                "Create a token with 'repo' scope and export {var}=<token>"
            )],
            DistribError::Publish(PublishError::TagDeletion { tag }) => vec![format!(
                "Delete the tag manually: git push --delete origin {tag}"
            )],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
