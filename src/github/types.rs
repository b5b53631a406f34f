//! Release records and hosting capabilities

use crate::error::GitHubError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::Path;

/// Release as returned by the hosting service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteRelease {
    /// Release ID
    pub id: u64,
    /// Release title, empty when unnamed
    #[serde(rename = "name", default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Tag the release points to
    pub tag_name: String,
    /// Draft releases are only visible to collaborators
    #[serde(default)]
    pub draft: bool,
    /// Pre-release flag
    #[serde(default)]
    pub prerelease: bool,
    /// Asset upload URL template
    #[serde(default)]
    pub upload_url: Option<String>,
    /// Release page
    #[serde(default)]
    pub html_url: Option<String>,
}

impl RemoteRelease {
    /// Whether this release may be replaced by a new build
    pub fn is_replaceable(&self) -> bool {
        self.draft || self.prerelease
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Release creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
    /// Tag to create, `v<version>`
    pub tag_name: String,
    /// Release title, the bare version
    pub name: String,
    /// Release description
    pub body: String,
    /// Draft flag
    pub draft: bool,
    /// Pre-release flag
    pub prerelease: bool,
}

impl NewRelease {
    /// Published pre-release for `version`.
    ///
    /// Assets of draft releases cannot be downloaded, so builds are released
    /// as pre-releases and replaced on the next publish of the same version.
    pub fn prerelease(version: &str, changelog: String) -> Self {
        Self {
            tag_name: format!("v{version}"),
            name: version.to_string(),
            body: changelog,
            draft: false,
            prerelease: true,
        }
    }
}

/// Uploaded release asset
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedAsset {
    /// Asset ID
    pub id: u64,
    /// File name
    pub name: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    /// Public download URL
    #[serde(rename = "browser_download_url", default)]
    pub download_url: String,
}

/// Structured release API
pub trait ReleaseHost {
    /// Every release of the repository, newest first
    fn list_releases(&self) -> impl Future<Output = Result<Vec<RemoteRelease>, GitHubError>> + Send;

    /// Delete a release record, its tag is left in place
    fn delete_release(
        &self,
        release: &RemoteRelease,
    ) -> impl Future<Output = Result<(), GitHubError>> + Send;

    /// Create a release and its tag
    fn create_release(
        &self,
        release: &NewRelease,
    ) -> impl Future<Output = Result<RemoteRelease, GitHubError>> + Send;

    /// Upload a file as an asset of `release`
    fn upload_asset(
        &self,
        release: &RemoteRelease,
        path: &Path,
    ) -> impl Future<Output = Result<UploadedAsset, GitHubError>> + Send;
}

/// Raw git reference operations
pub trait TagRefs {
    /// Delete `refs/tags/<tag_name>`, true on success
    fn delete_tag(&self, tag_name: &str) -> impl Future<Output = bool> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_from_api_json() {
        let release: RemoteRelease = serde_json::from_str(
            r#"{
                "id": 42,
                "name": null,
                "tag_name": "v1.0",
                "draft": true,
                "prerelease": false,
                "upload_url": "https://uploads.github.com/repos/o/r/releases/42/assets{?name,label}",
                "author": {"login": "tangb"}
            }"#,
        )
        .expect("release json");
        assert_eq!(release.id, 42);
        assert_eq!(release.title, "");
        assert!(release.is_replaceable());
    }

    #[test]
    fn test_prerelease_request() {
        let request = NewRelease::prerelease("0.0.20", "* fix".to_string());
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "tag_name": "v0.0.20",
                "name": "0.0.20",
                "body": "* fix",
                "draft": false,
                "prerelease": true
            })
        );
    }
}
