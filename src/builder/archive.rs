//! Release archive and checksum creation.

use super::cleanup::{matching_entries, remove_matching};
use crate::artifacts::{archive_name, checksum_name};
use crate::config::DistribConfig;
use crate::error::BuildError;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::{Path, PathBuf};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Archive and checksum written by [`bundle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Bundle {
    pub archive: PathBuf,
    pub checksum: PathBuf,
}

/// Zip the built package with the installer hooks and checksum the archive
pub(super) fn bundle(config: &DistribConfig, version: &str) -> Result<Bundle, BuildError> {
    let out = config.output_dir();
    let project = &config.project;
    let package = find_package(&out, project, version)?;
    log::info!("Bundling package {}", package.display());

    remove_matching(&out, &format!("{project}_*.zip"))?;
    remove_matching(&out, &format!("{project}_*.sha256"))?;

    let preinst = config.root_dir.join(&config.preinst_script);
    let postinst = config.root_dir.join(&config.postinst_script);
    let entries = [
        (format!("{project}.deb"), package, 0o644),
        (basename(&preinst)?, preinst, 0o755),
        (basename(&postinst)?, postinst, 0o755),
    ];

    let archive_file = archive_name(project, version);
    let archive = out.join(&archive_file);
    write_archive(&archive, &entries)?;

    let digest = sha256_file(&archive)?;
    let checksum = out.join(checksum_name(project, version));
    std::fs::write(&checksum, format!("{digest}  {archive_file}\n")).map_err(|source| {
        BuildError::Io {
            operation: "Unable to write",
            path: checksum.clone(),
            source,
        }
    })?;
    log::info!("Archive {} sha256={}", archive.display(), digest);

    Ok(Bundle { archive, checksum })
}

/// The `.deb` debuild produced for `version`
fn find_package(dir: &Path, project: &str, version: &str) -> Result<PathBuf, BuildError> {
    let pattern = format!("{project}_{version}*.deb");
    matching_entries(dir, &pattern)?
        .into_iter()
        .next()
        .map(|name| dir.join(name))
        .ok_or_else(|| BuildError::PackageNotFound {
            dir: dir.to_path_buf(),
            pattern,
        })
}

fn basename(path: &Path) -> Result<String, BuildError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| BuildError::Io {
            operation: "Invalid installer hook path",
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "no file name"),
        })
}

fn write_archive(path: &Path, entries: &[(String, PathBuf, u32)]) -> Result<(), BuildError> {
    let archive_err = |source| BuildError::Archive {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(|source| BuildError::Io {
        operation: "Unable to create",
        path: path.to_path_buf(),
        source,
    })?;
    let mut zip = zip::ZipWriter::new(file);

    for (name, source_path, mode) in entries {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(*mode);
        zip.start_file(name.as_str(), options).map_err(archive_err)?;

        let mut source = File::open(source_path).map_err(|source| BuildError::Io {
            operation: "Unable to open",
            path: source_path.clone(),
            source,
        })?;
        std::io::copy(&mut source, &mut zip).map_err(|source| BuildError::Io {
            operation: "Unable to archive",
            path: source_path.clone(),
            source,
        })?;
    }

    zip.finish().map_err(archive_err)?;
    Ok(())
}

/// Hex sha256 of a file
pub(super) fn sha256_file(path: &Path) -> Result<String, BuildError> {
    let io_err = |source| BuildError::Io {
        operation: "Unable to hash",
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(io_err)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(io_err)?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn project(dir: &Path) -> DistribConfig {
        let root = dir.join("cleep");
        std::fs::create_dir_all(root.join("scripts")).expect("scripts");
        std::fs::write(root.join("scripts/preinst.sh"), b"#!/bin/sh\necho pre\n").expect("preinst");
        std::fs::write(root.join("scripts/postinst.sh"), b"#!/bin/sh\necho post\n").expect("postinst");
        DistribConfig {
            root_dir: root,
            ..DistribConfig::default()
        }
    }

    #[test]
    fn test_bundle_archive_layout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = project(dir.path());
        std::fs::write(dir.path().join("raspiot_1.2.3_armhf.deb"), b"debian package").expect("deb");
        std::fs::write(dir.path().join("raspiot_1.2.2.zip"), b"stale").expect("stale zip");

        let bundle = bundle(&config, "1.2.3").expect("bundle");

        assert!(!dir.path().join("raspiot_1.2.2.zip").exists());
        let mut archive =
            zip::ZipArchive::new(File::open(&bundle.archive).expect("open")).expect("zip");
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["postinst.sh", "preinst.sh", "raspiot.deb"]);

        let mut content = String::new();
        archive
            .by_name("raspiot.deb")
            .expect("deb entry")
            .read_to_string(&mut content)
            .expect("read");
        assert_eq!(content, "debian package");

        let hook = archive.by_name("preinst.sh").expect("hook entry");
        assert_eq!(hook.unix_mode().map(|m| m & 0o777), Some(0o755));
    }

    #[test]
    fn test_checksum_file_matches_archive() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = project(dir.path());
        std::fs::write(dir.path().join("raspiot_0.1_armhf.deb"), b"pkg").expect("deb");

        let bundle = bundle(&config, "0.1").expect("bundle");

        let line = std::fs::read_to_string(&bundle.checksum).expect("checksum");
        let digest = sha256_file(&bundle.archive).expect("digest");
        assert_eq!(line, format!("{digest}  raspiot_0.1.zip\n"));
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn test_missing_package() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = project(dir.path());
        assert!(matches!(
            bundle(&config, "0.1"),
            Err(BuildError::PackageNotFound { .. })
        ));
    }
}
