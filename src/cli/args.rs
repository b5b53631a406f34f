//! Command line argument parsing and validation.

use crate::config::{CONFIG_PATH_VAR, DistribConfig};
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Build the Cleep debian package and publish it on GitHub
#[derive(Parser, Debug)]
#[command(
    name = "cleep_distrib",
    version,
    about = "Build the Cleep debian package and publish it on GitHub",
    long_about = "Build the Cleep debian package and publish it as a GitHub pre-release.

Environment:
  SENTRY_DSN            Sentry DSN embedded in the package (build)
  GITHUB_ACCESS_TOKEN   GitHub token with repo scope (publish)

Usage:
  cleep_distrib build
  cleep_distrib publish 0.0.20
  cleep_distrib release"
)]
pub struct Args {
    /// TOML configuration file
    #[arg(long, global = true, env = CONFIG_PATH_VAR, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project root directory, overrides the config file
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// GitHub repository as owner/repo, overrides the config file
    #[arg(long, global = true, value_name = "OWNER/REPO")]
    pub repo: Option<String>,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Build the package archive and its checksum
    Build,

    /// Publish a built version as a GitHub pre-release
    Publish {
        /// Version to publish, as in debian/changelog
        version: String,
    },

    /// Print the changelog excerpt of a built version
    Changelog {
        /// Version to extract
        version: String,
    },

    /// Build, then publish the built version
    Release {
        /// Expected version, must match debian/changelog when given
        version: Option<String>,
    },
}

impl Command {
    /// Subcommand name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Build => "build",
            Command::Publish { .. } => "publish",
            Command::Changelog { .. } => "changelog",
            Command::Release { .. } => "release",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Resolve the configuration: file or defaults, then flag overrides
    pub fn distrib_config(&self) -> Result<DistribConfig> {
        let mut config = DistribConfig::load(self.config.as_deref())?;
        if let Some(root) = &self.root {
            config.root_dir = root.clone();
        }
        if let Some(repo) = &self.repo {
            config.set_github_repo(repo)?;
        }
        config.validate()?;
        Ok(config)
    }
}
