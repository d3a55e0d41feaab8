//! CLI integration tests for Berth.
//!
//! These tests drive the `berth` binary against a fake clang toolchain and a
//! fake extracted bundle made of shell scripts.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the berth binary command, isolated from the user's config.
fn berth(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("berth").unwrap();
    cmd.env("HOME", home).env_remove("BERTH_CLANG");
    cmd
}

/// Create a temporary directory for test trees.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

#[cfg(unix)]
fn write_script(path: &Path, contents: &str) {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// Fake clang under `root/llvm`; returns the driver path.
#[cfg(unix)]
fn fake_toolchain(root: &Path, version: &str) -> PathBuf {
    let llvm = root.join("llvm");
    fs::create_dir_all(llvm.join("lib/clang").join(version)).unwrap();
    fs::create_dir_all(llvm.join("include/c++/v1")).unwrap();

    let clang = llvm.join("bin/clang");
    write_script(
        &clang,
        &format!("#!/bin/sh\necho \"clang version {version} (fake)\"\n"),
    );
    clang
}

/// Fake bundle under `root/bundle` whose analyzer exits with
/// `analyzer_exit` and whose fixer edits two files.
#[cfg(unix)]
fn fake_bundle(root: &Path, analyzer_exit: i32) -> PathBuf {
    let bundle = root.join("bundle");
    write_script(
        &bundle.join("bin/include-what-you-use"),
        &format!(
            "#!/bin/sh\necho 'demo.hpp should remove these lines:' >&2\nexit {analyzer_exit}\n"
        ),
    );
    write_script(
        &bundle.join("bin/fix_includes.py"),
        "#!/bin/sh\ncat >/dev/null\necho 'IWYU edited 2 files on your behalf.'\nexit 2\n",
    );
    bundle
}

// ============================================================================
// berth releases
// ============================================================================

#[test]
fn test_releases_lists_table() {
    let tmp = temp_dir();

    berth(tmp.path())
        .arg("releases")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.7"))
        .stdout(predicate::str::contains("(default)"))
        .stdout(predicate::str::contains("legacy"));
}

#[test]
fn test_releases_json() {
    let tmp = temp_dir();

    let output = berth(tmp.path())
        .args(["releases", "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 5);
    assert_eq!(json[2]["layout"], "nested");
}

#[test]
fn test_invalid_format() {
    let tmp = temp_dir();

    berth(tmp.path())
        .args(["releases", "--format", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid output format"));
}

// ============================================================================
// berth plan
// ============================================================================

#[test]
fn test_plan_unknown_release() {
    let tmp = temp_dir();

    berth(tmp.path())
        .args(["plan", "--release", "0.1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown release `0.1`"))
        .stderr(predicate::str::contains("berth releases"));
}

#[cfg(unix)]
#[test]
fn test_plan_json_shows_mapping() {
    let tmp = temp_dir();
    let clang = fake_toolchain(tmp.path(), "3.9.1");

    let output = berth(tmp.path())
        .args(["plan", "--format", "json", "--clang"])
        .arg(&clang)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["resolution"]["variant"], "nested");
    assert_eq!(
        json["resolution"]["mapping"]["entry_points"]["analyzer"]["root"],
        "shared-bin"
    );
    assert_eq!(json["toolchain"]["version"], "3.9.1");
}

#[cfg(unix)]
#[test]
fn test_plan_uses_project_config() {
    let tmp = temp_dir();
    let clang = fake_toolchain(tmp.path(), "3.5.2");
    let project = tmp.path().join("project");
    fs::create_dir_all(project.join(".berth")).unwrap();
    fs::write(
        project.join(".berth/config.toml"),
        format!(
            "[toolchain]\nclang = \"{}\"\n\n[install]\nrelease = \"0.3\"\n",
            clang.display()
        ),
    )
    .unwrap();

    berth(tmp.path())
        .arg("plan")
        .current_dir(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("include-what-you-use 0.3"))
        .stdout(predicate::str::contains("flat layout"));
}

#[cfg(unix)]
#[test]
fn test_plan_too_old_toolchain() {
    let tmp = temp_dir();
    let clang = fake_toolchain(tmp.path(), "3.8.1");

    berth(tmp.path())
        .args(["plan", "--clang"])
        .arg(&clang)
        .assert()
        .failure()
        .stderr(predicate::str::contains("clang 3.8.1 is too old"));
}

// ============================================================================
// berth install / verify
// ============================================================================

#[cfg(unix)]
#[test]
fn test_install_end_to_end() {
    let tmp = temp_dir();
    let clang = fake_toolchain(tmp.path(), "3.9.1");
    let bundle = fake_bundle(tmp.path(), 6);
    let prefix = tmp.path().join("opt");
    let bin_dir = tmp.path().join("bin");

    berth(tmp.path())
        .arg("install")
        .arg("--bundle")
        .arg(&bundle)
        .arg("--prefix")
        .arg(&prefix)
        .arg("--bin-dir")
        .arg(&bin_dir)
        .arg("--clang")
        .arg(&clang)
        .assert()
        .success()
        .stdout(predicate::str::contains("nested layout"))
        .stdout(predicate::str::contains("Result: PASSED (4 edits suggested, 2 files edited)"));

    assert!(prefix.join("iwyu/bin/include-what-you-use").is_file());
    assert!(prefix.join("iwyu/lib/clang/3.9.0").is_dir());
    assert!(bin_dir.join("iwyu").exists());
    assert!(bin_dir.join("fix_include").exists());

    berth(tmp.path())
        .arg("verify")
        .arg("--prefix")
        .arg(&prefix)
        .arg("--bin-dir")
        .arg(&bin_dir)
        .arg("--clang")
        .arg(&clang)
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] fixer exit code"));
}

#[cfg(unix)]
#[test]
fn test_install_failed_verification() {
    let tmp = temp_dir();
    let clang = fake_toolchain(tmp.path(), "3.9.1");
    let bundle = fake_bundle(tmp.path(), 3);
    let prefix = tmp.path().join("opt");

    berth(tmp.path())
        .arg("install")
        .arg("--bundle")
        .arg(&bundle)
        .arg("--prefix")
        .arg(&prefix)
        .arg("--clang")
        .arg(&clang)
        .assert()
        .failure()
        .stderr(predicate::str::contains("verification failed at analyzer exit code"));

    // The tree stays for inspection.
    assert!(prefix.join("iwyu/bin/fix_include").is_file());
}

#[cfg(unix)]
#[test]
fn test_install_conflicting_file() {
    let tmp = temp_dir();
    let clang = fake_toolchain(tmp.path(), "3.9.1");
    let bundle = fake_bundle(tmp.path(), 6);
    let prefix = tmp.path().join("opt");
    fs::create_dir_all(prefix.join("bin")).unwrap();
    fs::write(prefix.join("bin/iwyu"), "not ours").unwrap();

    berth(tmp.path())
        .arg("install")
        .arg("--bundle")
        .arg(&bundle)
        .arg("--prefix")
        .arg(&prefix)
        .arg("--clang")
        .arg(&clang)
        .assert()
        .failure()
        .stderr(predicate::str::contains("a file already exists there"));

    assert_eq!(fs::read_to_string(prefix.join("bin/iwyu")).unwrap(), "not ours");
}

#[test]
fn test_install_requires_bundle() {
    let tmp = temp_dir();

    berth(tmp.path())
        .arg("install")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--bundle"));
}

// ============================================================================
// berth completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = temp_dir();

    berth(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("berth"));
}
