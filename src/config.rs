//! Shared configuration for the builder and the publisher.

use crate::error::{ConfigError, Result};
use crate::github::DEFAULT_API_BASE_URL;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable holding the Sentry DSN embedded in the build
pub const SENTRY_DSN_VAR: &str = "SENTRY_DSN";

/// Environment variable holding the GitHub access token
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_ACCESS_TOKEN";

/// Environment variable pointing to a TOML config file
pub const CONFIG_PATH_VAR: &str = "CLEEP_DISTRIB_CONFIG";

/// Build and publish configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DistribConfig {
    /// Project checkout the package is built from
    pub root_dir: PathBuf,
    /// Debian source package name
    pub project: String,
    /// Debian architecture of the .changes file
    pub arch: String,
    /// GitHub repository owner
    pub github_owner: String,
    /// GitHub repository name
    pub github_repo: String,
    /// GitHub REST API base URL
    pub api_base_url: String,
    /// Pre-install hook, relative to `root_dir`
    pub preinst_script: PathBuf,
    /// Post-install hook, relative to `root_dir`
    pub postinst_script: PathBuf,
    /// File that must declare the debian/changelog version, relative to `root_dir`
    pub version_file: Option<PathBuf>,
    /// Packaging toolchain command line, run through `sh -c`
    pub packaging_command: String,
}

impl Default for DistribConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("/root/cleep"),
            project: "raspiot".to_string(),
            arch: "armhf".to_string(),
            github_owner: "tangb".to_string(),
            github_repo: "cleep".to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            preinst_script: PathBuf::from("scripts/preinst.sh"),
            postinst_script: PathBuf::from("scripts/postinst.sh"),
            version_file: None,
            packaging_command: "debuild -us -uc".to_string(),
        }
    }
}

impl DistribConfig {
    /// Load configuration from a TOML file, missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, or the defaults when none is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Override the repository from `owner/repo` notation
    pub fn set_github_repo(&mut self, repo: &str) -> Result<()> {
        match repo.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                self.github_owner = owner.to_string();
                self.github_repo = name.trim_end_matches(".git").to_string();
                Ok(())
            }
            _ => Err(ConfigError::InvalidValue {
                field: "github_repo",
                reason: format!("'{repo}' is not in owner/repo format"),
            }
            .into()),
        }
    }

    /// Check values that would otherwise fail late in a build
    pub fn validate(&self) -> Result<()> {
        if self.project.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "project",
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        if self.packaging_command.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "packaging_command",
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Directory receiving the package, archive and checksum
    pub fn output_dir(&self) -> PathBuf {
        self.root_dir.join("..")
    }

    /// File expected to declare the version, `<project>/__init__.py` by default
    pub fn version_file_path(&self) -> PathBuf {
        match &self.version_file {
            Some(path) => self.root_dir.join(path),
            None => self.root_dir.join(&self.project).join("__init__.py"),
        }
    }
}

/// Snapshot of the process environment
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    /// Capture the current process environment
    pub fn from_env() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a variable, empty values count as unset
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).filter(|v| !v.is_empty()).cloned()
    }
}
