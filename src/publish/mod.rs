//! GitHub release publishing.
//!
//! A version is always published as a pre-release. When a draft or
//! pre-release with the same title already exists it is deleted together with
//! its tag, then recreated from the freshly built artifacts.

use crate::artifacts::ArtifactSet;
use crate::changelog;
use crate::config::{DistribConfig, EnvConfig};
use crate::error::{PublishError, Result};
use crate::github::{GitHubClient, NewRelease, ReleaseHost, RemoteRelease, TagRefs, UploadedAsset};
use std::path::PathBuf;

/// Outcome of a successful publish
#[derive(Debug, Clone)]
pub struct PublishReport {
    /// Newly created release
    pub release: RemoteRelease,
    /// Stale release deleted beforehand
    pub replaced: Option<RemoteRelease>,
    /// Uploaded assets, archive first
    pub assets: Vec<UploadedAsset>,
}

/// Release publisher
pub struct Publisher<H, R> {
    config: DistribConfig,
    host: H,
    refs: R,
}

impl Publisher<GitHubClient, GitHubClient> {
    /// Publisher for the configured GitHub repository
    pub fn github(config: DistribConfig, env: &EnvConfig) -> Result<Self> {
        let client = GitHubClient::from_config(&config, env)?;
        Ok(Self::new(config, client.clone(), client))
    }
}

impl<H, R> Publisher<H, R>
where
    H: ReleaseHost,
    R: TagRefs,
{
    /// Create a publisher from a release host and a tag reference capability
    pub fn new(config: DistribConfig, host: H, refs: R) -> Self {
        Self { config, host, refs }
    }

    /// Changelog excerpt of `version` from its `.changes` file.
    ///
    /// Read failures are logged and yield an empty changelog.
    pub fn changelog(&self, version: &str) -> String {
        let changes = ArtifactSet::new(&self.config, version).changes;
        match changelog::read_changelog(&changes, &self.config.project, version) {
            Ok(text) => {
                log::debug!("Changelog:\n{}", text);
                text
            }
            Err(e) => {
                log::error!("Unable to read changelog from {}: {}", changes.display(), e);
                String::new()
            }
        }
    }

    /// Publish the built artifacts of `version` as a pre-release
    pub async fn publish(&self, version: &str) -> Result<PublishReport> {
        validate_version(version)?;

        let artifacts = ArtifactSet::new(&self.config, version);
        let missing: Vec<PathBuf> = artifacts
            .missing()
            .into_iter()
            .filter(|path| *path != artifacts.changes)
            .map(PathBuf::from)
            .collect();
        if !missing.is_empty() {
            return Err(PublishError::MissingArtifacts { paths: missing }.into());
        }

        let changelog = self.changelog(version);

        let mut replaced = None;
        if let Some(existing) = self.find_release(version).await {
            if existing.is_replaceable() {
                self.delete_existing(&existing).await?;
                replaced = Some(existing);
            } else {
                log::warn!(
                    "Release \"{}\" is already published, creating it again will likely fail",
                    version
                );
            }
        }

        log::info!("Creating new release \"{}\"...", version);
        let request = NewRelease::prerelease(version, changelog);
        let release = self.host.create_release(&request).await.map_err(|source| {
            let err = PublishError::ReleaseCreation {
                title: version.to_string(),
                source,
            };
            log::error!("{}", err);
            err
        })?;

        let mut assets = Vec::with_capacity(2);
        for path in artifacts.assets() {
            log::info!("Uploading asset \"{}\"...", path.display());
            let asset = self.host.upload_asset(&release, path).await.map_err(|source| {
                let err = PublishError::AssetUpload {
                    path: path.to_path_buf(),
                    source,
                };
                log::error!("{}", err);
                err
            })?;
            assets.push(asset);
        }

        log::info!("Release \"{}\" published", version);
        Ok(PublishReport {
            release,
            replaced,
            assets,
        })
    }

    /// First release titled exactly `version`, lookup failures are logged
    async fn find_release(&self, version: &str) -> Option<RemoteRelease> {
        let releases = match self.host.list_releases().await {
            Ok(releases) => releases,
            Err(e) => {
                log::error!("Unable to list existing releases: {}", e);
                return None;
            }
        };
        releases.into_iter().find(|release| {
            log::debug!("{}", release.title);
            release.title == version
        })
    }

    async fn delete_existing(&self, release: &RemoteRelease) -> Result<()> {
        log::info!("Deleting existing version \"{}\"...", release.title);
        self.host.delete_release(release).await.map_err(|source| {
            let err = PublishError::ReleaseDeletion {
                title: release.title.clone(),
                source,
            };
            log::error!("{}", err);
            err
        })?;

        if !self.refs.delete_tag(&release.tag_name).await {
            return Err(PublishError::TagDeletion {
                tag: release.tag_name.clone(),
            }
            .into());
        }
        Ok(())
    }
}

/// Characters git refuses in a ref name, plus the URL delimiters `#` and `?`
const FORBIDDEN_IN_TAG: &[char] = &['/', '\\', '#', '?', '~', '^', ':', '*', '['];

/// The version becomes the `v<version>` tag, so it must be a valid ref component
fn validate_version(version: &str) -> std::result::Result<(), PublishError> {
    let reason = if version.is_empty() {
        "must not be empty"
    } else if version.chars().any(|c| c.is_whitespace() || c.is_control()) {
        "must not contain whitespace or control characters"
    } else if version.contains(FORBIDDEN_IN_TAG) {
        "must not contain any of / \\ # ? ~ ^ : * ["
    } else if version.contains("..") || version.contains("@{") {
        "must not contain '..' or '@{'"
    } else if version.ends_with('.') || version.ends_with(".lock") {
        "must not end with '.' or '.lock'"
    } else {
        return Ok(());
    };
    Err(PublishError::InvalidVersion {
        version: version.to_string(),
        reason: reason.to_string(),
    })
}
