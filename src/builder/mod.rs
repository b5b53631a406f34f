//! Debian package build.
//!
//! [`Builder::build`] runs the whole procedure rooted at
//! [`DistribConfig::root_dir`]: secret check, cleanup, version cross-check,
//! runtime config generation, the packaging toolchain, and finally the zip
//! archive and checksum in the parent directory.

mod archive;
mod cleanup;

use crate::artifacts::ArtifactSet;
use crate::changelog;
use crate::config::{DistribConfig, EnvConfig, SENTRY_DSN_VAR};
use crate::error::{BuildError, Result};
use crate::process::{self, OutputSink};
use std::path::Path;

/// Outcome of a build that got as far as running the toolchain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    /// Toolchain exited with code 0 and the archive was written
    pub succeeded: bool,
    /// Toolchain exit code, `None` if it was killed by a signal
    pub exit_code: Option<i32>,
    /// Version read from debian/changelog
    pub version: String,
    /// Produced artifacts, set on success
    pub artifacts: Option<ArtifactSet>,
}

/// Package builder
pub struct Builder {
    config: DistribConfig,
    env: EnvConfig,
    sink: OutputSink,
}

impl Builder {
    /// Create a builder streaming toolchain output to the log
    pub fn new(config: DistribConfig, env: EnvConfig) -> Self {
        Self {
            config,
            env,
            sink: process::log_sink(),
        }
    }

    /// Replace the toolchain output sink
    pub fn with_sink(mut self, sink: OutputSink) -> Self {
        self.sink = sink;
        self
    }

    /// Build configuration
    pub fn config(&self) -> &DistribConfig {
        &self.config
    }

    /// Build the package archive.
    ///
    /// Precondition and filesystem failures are errors. A toolchain that
    /// exits non-zero yields `Ok` with `succeeded == false` and its exit code.
    pub async fn build(&self) -> Result<BuildResult> {
        let config = &self.config;
        let root = &config.root_dir;
        log::info!("Building {} package in {}...", config.project, root.display());

        let dsn = self
            .env
            .get(SENTRY_DSN_VAR)
            .ok_or_else(|| BuildError::MissingSecret {
                var: SENTRY_DSN_VAR.to_string(),
            })?;

        cleanup::remove_previous_build(config)?;

        let version = changelog::debian_version(&root.join("debian").join("changelog"))?;
        changelog::check_source_version(&version, &config.version_file_path())?;
        log::info!("Version {}", version);

        write_runtime_config(root, &config.project, &dsn)?;

        let status = process::run_packaging_procedure(
            root,
            &config.packaging_command,
            self.sink.clone(),
        )
        .await?;

        let exit_code = status.code();
        if !status.success() {
            match exit_code {
                Some(code) => log::error!("Packaging toolchain failed with exit code {}", code),
                None => log::error!("Packaging toolchain terminated by a signal ({})", status),
            }
            return Ok(BuildResult {
                succeeded: false,
                exit_code,
                version,
                artifacts: None,
            });
        }
        log::debug!("Return code: {:?}", exit_code);

        cleanup::remove_toolchain_leftovers(config)?;
        let bundle = archive::bundle(config, &version)?;

        let artifacts = ArtifactSet {
            archive: bundle.archive,
            checksum: bundle.checksum,
            ..ArtifactSet::new(config, &version)
        };
        log::info!("Build of {} {} complete", config.project, version);
        Ok(BuildResult {
            succeeded: true,
            exit_code,
            version,
            artifacts: Some(artifacts),
        })
    }
}

/// `tmp/<project>.conf`, installed to /etc/default by the package
fn write_runtime_config(root: &Path, project: &str, dsn: &str) -> std::result::Result<(), BuildError> {
    let tmp = root.join("tmp");
    std::fs::create_dir_all(&tmp).map_err(|source| BuildError::Io {
        operation: "Unable to create",
        path: tmp.clone(),
        source,
    })?;
    let path = tmp.join(format!("{project}.conf"));
    std::fs::write(&path, format!("{SENTRY_DSN_VAR}={dsn}\n")).map_err(|source| BuildError::Io {
        operation: "Unable to write",
        path,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{LevelFilter, Log, Metadata, Record};
    use std::sync::{Mutex, Once};

    struct CaptureLogger {
        lines: Mutex<Vec<String>>,
    }

    impl Log for CaptureLogger {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &Record<'_>) {
            if let Ok(mut lines) = self.lines.lock() {
                lines.push(format!("{} {}", record.level(), record.args()));
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger {
        lines: Mutex::new(Vec::new()),
    };
    static INIT: Once = Once::new();

    fn captured_logs() -> &'static CaptureLogger {
        INIT.call_once(|| {
            log::set_logger(&LOGGER).expect("logger installed once");
            log::set_max_level(LevelFilter::Debug);
        });
        &LOGGER
    }

    fn project(packaging_command: &str) -> (tempfile::TempDir, DistribConfig) {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("cleep");
        std::fs::create_dir_all(root.join("debian")).expect("debian");
        std::fs::create_dir_all(root.join("raspiot")).expect("package");
        std::fs::write(
            root.join("debian/changelog"),
            "raspiot (2.1.0) stable; urgency=low\n",
        )
        .expect("changelog");
        std::fs::write(root.join("raspiot/__init__.py"), "__version__ = '2.1.0'\n")
            .expect("init");
        let config = DistribConfig {
            root_dir: root,
            packaging_command: packaging_command.to_string(),
            ..DistribConfig::default()
        };
        (dir, config)
    }

    #[tokio::test]
    async fn test_failed_toolchain_logs_exit_code() {
        let logs = captured_logs();
        let (_dir, config) = project("exit 3");
        let env = EnvConfig::from_pairs([(SENTRY_DSN_VAR, "https://key@sentry.io/1")]);

        let result = Builder::new(config, env).build().await.expect("build ran");

        assert_eq!(result.exit_code, Some(3));
        let lines = logs.lines.lock().expect("lock");
        assert!(
            lines
                .iter()
                .any(|l| l == "ERROR Packaging toolchain failed with exit code 3"),
            "{lines:?}"
        );
    }

    #[test]
    fn test_runtime_config_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_runtime_config(dir.path(), "raspiot", "https://key@sentry.io/1").expect("write");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("tmp/raspiot.conf")).expect("read"),
            "SENTRY_DSN=https://key@sentry.io/1\n"
        );
    }
}
