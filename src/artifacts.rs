//! Build artifact naming.
//!
//! All artifacts live in the parent of the project root and are named
//! `<project>_<version>[_<arch>].<ext>`, the way debuild names its outputs.

use crate::config::DistribConfig;
use std::path::{Path, PathBuf};

/// Files produced by a build for one version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    /// Zip archive with the package and installer hooks
    pub archive: PathBuf,
    /// sha256sum of the archive
    pub checksum: PathBuf,
    /// debuild changes file
    pub changes: PathBuf,
}

impl ArtifactSet {
    /// Derive the artifact paths for `version`
    pub fn new(config: &DistribConfig, version: &str) -> Self {
        let dir = config.output_dir();
        Self {
            archive: dir.join(archive_name(&config.project, version)),
            checksum: dir.join(checksum_name(&config.project, version)),
            changes: dir.join(format!("{}_{}_{}.changes", config.project, version, config.arch)),
        }
    }

    /// Artifacts that are not on disk, each one logged
    pub fn missing(&self) -> Vec<&Path> {
        let mut missing = Vec::new();
        for (kind, path) in [
            ("Archive", &self.archive),
            ("Checksum", &self.checksum),
            ("Changes", &self.changes),
        ] {
            if !path.is_file() {
                log::error!("{} file \"{}\" does not exist", kind, path.display());
                missing.push(path.as_path());
            }
        }
        missing
    }

    /// Assets uploaded to the release, in upload order
    pub fn assets(&self) -> [&Path; 2] {
        [&self.archive, &self.checksum]
    }
}

/// `<project>_<version>.zip`
pub fn archive_name(project: &str, version: &str) -> String {
    format!("{project}_{version}.zip")
}

/// `<project>_<version>.sha256`
pub fn checksum_name(project: &str, version: &str) -> String {
    format!("{project}_{version}.sha256")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_next_to_root() {
        let config = DistribConfig {
            root_dir: PathBuf::from("/work/cleep"),
            ..DistribConfig::default()
        };
        let set = ArtifactSet::new(&config, "0.0.20");
        assert_eq!(set.archive, PathBuf::from("/work/cleep/../raspiot_0.0.20.zip"));
        assert_eq!(set.checksum, PathBuf::from("/work/cleep/../raspiot_0.0.20.sha256"));
        assert_eq!(
            set.changes,
            PathBuf::from("/work/cleep/../raspiot_0.0.20_armhf.changes")
        );
        assert_eq!(set.assets(), [set.archive.as_path(), set.checksum.as_path()]);
    }

    #[test]
    fn test_missing_reports_each_absent_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("cleep");
        std::fs::create_dir(&root).expect("root");
        let config = DistribConfig {
            root_dir: root,
            ..DistribConfig::default()
        };
        let set = ArtifactSet::new(&config, "1.0");
        std::fs::write(&set.archive, b"zip").expect("archive");

        let missing = set.missing();
        assert_eq!(missing, vec![set.checksum.as_path(), set.changes.as_path()]);
    }
}
