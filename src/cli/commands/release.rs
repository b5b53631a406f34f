//! Release command implementation: build, then publish the built version.

use super::build::run_build;
use super::publish::execute_publish;
use crate::changelog::debian_version;
use crate::cli::OutputManager;
use crate::config::{DistribConfig, EnvConfig};
use crate::error::{PublishError, Result};
use crate::github::GitHubClient;

/// Execute release command
pub(super) async fn execute_release(
    config: DistribConfig,
    env: EnvConfig,
    expected: Option<&str>,
    output: &OutputManager,
) -> Result<i32> {
    // Fail on a missing token or version typo before spending minutes in debuild
    GitHubClient::from_config(&config, &env)?;
    if let Some(expected) = expected {
        let version = debian_version(&config.root_dir.join("debian").join("changelog"))?;
        if expected != version {
            return Err(PublishError::InvalidVersion {
                version: expected.to_string(),
                reason: format!("debian/changelog declares {version}"),
            }
            .into());
        }
    }

    let built = run_build(config.clone(), env.clone(), output).await?;
    if !built.succeeded {
        return Ok(1);
    }

    execute_publish(config, &env, &built.version, output).await
}
