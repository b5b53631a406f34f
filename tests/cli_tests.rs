use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cleep_distrib() -> Command {
    let mut cmd = Command::cargo_bin("cleep_distrib").expect("binary");
    cmd.env_remove("SENTRY_DSN")
        .env_remove("GITHUB_ACCESS_TOKEN")
        .env_remove("CLEEP_DISTRIB_CONFIG");
    cmd
}

/// Checkout at `<tmp>/cleep` with a 1.0 changes file next to it
fn checkout() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("cleep/debian")).expect("root");
    fs::write(
        dir.path().join("cleep/debian/changelog"),
        "raspiot (1.0) stable; urgency=low\n\n  * fix bug\n",
    )
    .expect("debian changelog");
    fs::write(
        dir.path().join("raspiot_1.0_armhf.changes"),
        "Changes:\n raspiot (1.0) stable; urgency=low\n .\n   * fix bug\n   * add feature\nChecksums-Sha1:\n abc 1 raspiot_1.0_armhf.deb\n",
    )
    .expect("changes");
    dir
}

#[test]
fn test_help_lists_commands() {
    cleep_distrib()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("changelog"));
}

#[test]
fn test_changelog_prints_excerpt() {
    let dir = checkout();
    cleep_distrib()
        .arg("--root")
        .arg(dir.path().join("cleep"))
        .args(["changelog", "1.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* fix bug\n* add feature"))
        .stdout(predicate::str::contains("Checksums").not());
}

#[test]
fn test_changelog_unknown_version_fails() {
    let dir = checkout();
    cleep_distrib()
        .arg("--root")
        .arg(dir.path().join("cleep"))
        .args(["changelog", "2.0"])
        .assert()
        .code(1);
}

#[test]
fn test_publish_without_token_fails() {
    let dir = checkout();
    cleep_distrib()
        .arg("--root")
        .arg(dir.path().join("cleep"))
        .args(["publish", "1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GITHUB_ACCESS_TOKEN"));
}

#[test]
fn test_build_without_secret_fails() {
    let dir = checkout();
    cleep_distrib()
        .arg("--root")
        .arg(dir.path().join("cleep"))
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SENTRY_DSN"));
}

#[test]
fn test_invalid_config_file_fails() {
    let dir = checkout();
    let config = dir.path().join("distrib.toml");
    fs::write(&config, "unknown_key = true\n").expect("config");
    cleep_distrib()
        .arg("--config")
        .arg(&config)
        .args(["changelog", "1.0"])
        .assert()
        .failure();
}

/// Config file whose packaging command leaves a marker in the root
fn marker_config(dir: &TempDir) -> std::path::PathBuf {
    let config = dir.path().join("distrib.toml");
    fs::write(
        &config,
        "packaging_command = \"touch toolchain-ran\"\napi_base_url = \"http://127.0.0.1:9\"\n",
    )
    .expect("config");
    config
}

#[test]
fn test_release_rejects_version_not_in_debian_changelog() {
    let dir = checkout();
    let config = marker_config(&dir);
    cleep_distrib()
        .env("SENTRY_DSN", "https://key@sentry.io/1")
        .env("GITHUB_ACCESS_TOKEN", "secret-token")
        .arg("--config")
        .arg(&config)
        .arg("--root")
        .arg(dir.path().join("cleep"))
        .args(["release", "2.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("debian/changelog declares 1.0"))
        .stdout(predicate::str::contains("═══ Build").not());
    assert!(!dir.path().join("cleep/toolchain-ran").exists());
}

#[test]
fn test_release_without_token_fails_before_building() {
    let dir = checkout();
    let config = marker_config(&dir);
    cleep_distrib()
        .env("SENTRY_DSN", "https://key@sentry.io/1")
        .arg("--config")
        .arg(&config)
        .arg("--root")
        .arg(dir.path().join("cleep"))
        .arg("release")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GITHUB_ACCESS_TOKEN"))
        .stdout(predicate::str::contains("═══ Build").not());
    assert!(!dir.path().join("cleep/toolchain-ran").exists());
}
