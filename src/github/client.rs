//! GitHub REST client over reqwest

use super::types::{NewRelease, ReleaseHost, RemoteRelease, TagRefs, UploadedAsset};
use crate::config::{DistribConfig, EnvConfig, GITHUB_TOKEN_VAR};
use crate::error::GitHubError;
use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use std::path::Path;
use tokio_util::io::ReaderStream;

/// Public GitHub API
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

const RELEASES_PER_PAGE: usize = 100;

/// Authenticated client for one repository
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    token: String,
    api_base_url: Url,
    owner: String,
    repo: String,
}

impl GitHubClient {
    /// Create a client for `owner/repo`
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        api_base_url: impl Into<String>,
    ) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let api_base_url: String = api_base_url.into();
        let api_base_url = Url::parse(&api_base_url).map_err(|e| GitHubError::InvalidUrl {
            url: api_base_url.clone(),
            reason: e.to_string(),
        })?;
        if api_base_url.cannot_be_a_base() {
            return Err(GitHubError::InvalidUrl {
                url: api_base_url.to_string(),
                reason: "cannot be a base URL".to_string(),
            });
        }

        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            token: token.into(),
            api_base_url,
            owner: owner.into(),
            repo: repo.into(),
        })
    }

    /// Create the client for the configured repository, token from the environment
    pub fn from_config(config: &DistribConfig, env: &EnvConfig) -> Result<Self, GitHubError> {
        let token = env
            .get(GITHUB_TOKEN_VAR)
            .ok_or_else(|| GitHubError::MissingToken {
                var: GITHUB_TOKEN_VAR.to_string(),
            })?;
        Self::new(
            token,
            &config.github_owner,
            &config.github_repo,
            &config.api_base_url,
        )
    }

    /// `owner/repo`
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// `<base>/repos/<owner>/<repo>/<segments..>`, each segment percent-encoded
    fn repo_url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base_url.clone();
        // Checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["repos", self.owner.as_str(), self.repo.as_str()])
                .extend(segments);
        }
        url
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token)
    }

    /// Send and turn non-2xx responses into [`GitHubError::Status`]
    async fn send(
        &self,
        method: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, GitHubError> {
        let response = self.authed(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        Err(GitHubError::Status {
            method: method.to_string(),
            url,
            status: status.as_u16(),
            body,
        })
    }
}

impl ReleaseHost for GitHubClient {
    async fn list_releases(&self) -> Result<Vec<RemoteRelease>, GitHubError> {
        let url = self.repo_url(&["releases"]);
        let mut releases = Vec::new();
        for page in 1.. {
            let request = self.http.get(url.clone()).query(&[
                ("per_page", RELEASES_PER_PAGE.to_string()),
                ("page", page.to_string()),
            ]);
            let batch: Vec<RemoteRelease> = self.send("GET", request).await?.json().await?;
            let count = batch.len();
            releases.extend(batch);
            if count < RELEASES_PER_PAGE {
                break;
            }
        }
        log::debug!("{} release(s) in {}", releases.len(), self.repository());
        Ok(releases)
    }

    async fn delete_release(&self, release: &RemoteRelease) -> Result<(), GitHubError> {
        let url = self.repo_url(&["releases", &release.id.to_string()]);
        self.send("DELETE", self.http.delete(url)).await?;
        Ok(())
    }

    async fn create_release(&self, release: &NewRelease) -> Result<RemoteRelease, GitHubError> {
        let request = self.http.post(self.repo_url(&["releases"])).json(release);
        let created = self.send("POST", request).await?.json().await?;
        Ok(created)
    }

    async fn upload_asset(
        &self,
        release: &RemoteRelease,
        path: &Path,
    ) -> Result<UploadedAsset, GitHubError> {
        let io_err = |source| GitHubError::Io {
            path: path.to_path_buf(),
            source,
        };
        let template = release
            .upload_url
            .as_deref()
            .ok_or(GitHubError::NoUploadUrl { id: release.id })?;
        // Strip the RFC 6570 `{?name,label}` suffix
        let base = template.split_once('{').map_or(template, |(base, _)| base);
        let mut url = Url::parse(base).map_err(|e| GitHubError::InvalidUrl {
            url: template.to_string(),
            reason: e.to_string(),
        })?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| io_err(std::io::Error::other("asset path has no file name")))?;

        url.query_pairs_mut().append_pair("name", name);

        let file = tokio::fs::File::open(path).await.map_err(io_err)?;
        let size = file.metadata().await.map_err(io_err)?.len();

        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, asset_content_type(path))
            .header(CONTENT_LENGTH, size)
            .body(reqwest::Body::wrap_stream(ReaderStream::new(file)));
        let asset = self.send("POST", request).await?.json().await?;
        Ok(asset)
    }
}

impl TagRefs for GitHubClient {
    async fn delete_tag(&self, tag_name: &str) -> bool {
        let url = self.repo_url(&["git", "refs", "tags", tag_name]);
        match self.authed(self.http.delete(url)).send().await {
            // The endpoint answers 204, 200 is accepted too
            Ok(response) if matches!(response.status(), StatusCode::OK | StatusCode::NO_CONTENT) => {
                log::debug!("Deleted tag {}", tag_name);
                true
            }
            Ok(response) => {
                log::error!(
                    "Unable to delete tag \"{}\" [status={}]",
                    tag_name,
                    response.status().as_u16()
                );
                false
            }
            Err(e) => {
                log::error!("Error deleting tag \"{}\": {}", tag_name, e);
                false
            }
        }
    }
}

/// Content type sent with an uploaded asset
fn asset_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("zip") => "application/zip",
        Some("deb") => "application/vnd.debian.binary-package",
        Some("sha256") | Some("changes") => "text/plain",
        _ => "application/octet-stream",
    }
}
