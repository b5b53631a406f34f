//! Filesystem cleanup around a package build.

use crate::config::DistribConfig;
use crate::error::BuildError;
use glob::Pattern;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Remove outputs of a previous build so a rebuild starts from scratch
pub(super) fn remove_previous_build(config: &DistribConfig) -> Result<(), BuildError> {
    let root = &config.root_dir;
    let debian = root.join("debian");

    remove_path(&root.join("build"))?;
    remove_path(&debian.join(&config.project))?;
    remove_matching(&debian, "*debhelper*")?;
    remove_matching(
        &config.output_dir(),
        &format!("{}_*_{}.*", config.project, config.arch),
    )?;
    remove_path(&root.join("tmp"))
}

/// Remove directories debuild and setuptools leave in the project root
pub(super) fn remove_toolchain_leftovers(config: &DistribConfig) -> Result<(), BuildError> {
    let root = &config.root_dir;
    remove_path(&root.join(format!("{}.egg-info", config.project)))?;
    remove_path(&root.join(format!("py{}.egg-info", config.project)))?;
    remove_path(&root.join("tmp"))
}

/// Remove a file or directory tree, absent paths are fine
pub(super) fn remove_path(path: &Path) -> Result<(), BuildError> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => {
            log::debug!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(BuildError::Io {
            operation: "Unable to remove",
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Remove the entries of `dir` whose file name matches `pattern`
pub(super) fn remove_matching(dir: &Path, pattern: &str) -> Result<(), BuildError> {
    for entry in matching_entries(dir, pattern)? {
        remove_path(&dir.join(entry))?;
    }
    Ok(())
}

/// File names in `dir` matching `pattern`, sorted
pub(super) fn matching_entries(dir: &Path, pattern: &str) -> Result<Vec<String>, BuildError> {
    let pattern = Pattern::new(pattern).map_err(|e| BuildError::Io {
        operation: "Invalid cleanup pattern for",
        path: dir.to_path_buf(),
        source: std::io::Error::new(ErrorKind::InvalidInput, e.to_string()),
    })?;

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(BuildError::Io {
                operation: "Unable to list",
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| BuildError::Io {
            operation: "Unable to list",
            path: dir.to_path_buf(),
            source,
        })?;
        if let Some(name) = entry.file_name().to_str()
            && pattern.matches(name)
        {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent dir");
        }
        fs::write(path, b"x").expect("write");
    }

    #[test]
    fn test_remove_previous_build() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("cleep");
        let config = DistribConfig {
            root_dir: root.clone(),
            ..DistribConfig::default()
        };

        touch(&root.join("build/lib/x.py"));
        touch(&root.join("debian/raspiot/usr/bin/x"));
        touch(&root.join("debian/raspiot.debhelper.log"));
        touch(&root.join("debian/changelog"));
        touch(&root.join("tmp/raspiot.conf"));
        touch(&dir.path().join("raspiot_0.0.19_armhf.deb"));
        touch(&dir.path().join("raspiot_0.0.19_armhf.changes"));
        touch(&dir.path().join("unrelated_1.0_armhf.deb"));

        remove_previous_build(&config).expect("cleanup");

        assert!(!root.join("build").exists());
        assert!(!root.join("debian/raspiot").exists());
        assert!(!root.join("debian/raspiot.debhelper.log").exists());
        assert!(!root.join("tmp").exists());
        assert!(root.join("debian/changelog").exists());
        assert!(!dir.path().join("raspiot_0.0.19_armhf.deb").exists());
        assert!(!dir.path().join("raspiot_0.0.19_armhf.changes").exists());
        assert!(dir.path().join("unrelated_1.0_armhf.deb").exists());
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = DistribConfig {
            root_dir: dir.path().join("cleep"),
            ..DistribConfig::default()
        };
        remove_previous_build(&config).expect("first");
        remove_previous_build(&config).expect("second");
        remove_path(&PathBuf::from(dir.path()).join("nothing")).expect("absent path");
    }

    #[test]
    fn test_matching_entries_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(&dir.path().join("b.deb"));
        touch(&dir.path().join("a.deb"));
        touch(&dir.path().join("a.zip"));
        assert_eq!(
            matching_entries(dir.path(), "*.deb").expect("list"),
            vec!["a.deb".to_string(), "b.deb".to_string()]
        );
    }
}
