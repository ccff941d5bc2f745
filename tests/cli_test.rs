//! CLI contract tests
//!
//! Run the built binary and check exit codes and operator-facing messages
//! for the input-validation paths, which fail before any external tool runs.

use std::path::Path;
use std::process::Command;

fn abidiff_bin() -> String {
    env!("CARGO_BIN_EXE_pkg-abidiff").to_string()
}

/// Run the binary in `dir` and return (exit code, stdout, stderr)
fn run_in(dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(abidiff_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("PKG_ABIDIFF_DUMPS_DIR")
        .env_remove("PKG_ABIDIFF_REPORT_DIR")
        .output()
        .expect("Failed to run pkg-abidiff");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

#[test]
fn test_missing_old_packages() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_in(dir.path(), &["--new", "b.rpm"]);
    assert_eq!(code, 1);
    assert!(
        stderr.contains("old packages are not specified"),
        "stderr: {}",
        stderr
    );
    assert!(!dir.path().join("compat_report").exists());
}

#[test]
fn test_inaccessible_package() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_in(
        dir.path(),
        &[
            "--old",
            "missing-1.0.rpm",
            "missing-debuginfo-1.0.rpm",
            "--new",
            "missing-2.0.rpm",
            "missing-debuginfo-2.0.rpm",
        ],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("can't access"), "stderr: {}", stderr);
    assert!(stderr.contains("missing-1.0.rpm"), "stderr: {}", stderr);
}

#[test]
fn test_unknown_package_format() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("libfoo-1.0.tar.gz"), b"").unwrap();
    std::fs::write(dir.path().join("libfoo-2.0.tar.gz"), b"").unwrap();

    let (code, _, stderr) = run_in(
        dir.path(),
        &["--old", "libfoo-1.0.tar.gz", "--new", "libfoo-2.0.tar.gz"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown format"), "stderr: {}", stderr);
}

#[test]
fn test_workers_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_in(dir.path(), &["--workers", "0", "--old", "a.rpm"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("workers must be at least 1"), "stderr: {}", stderr);
}

#[test]
fn test_help_lists_package_options() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_in(dir.path(), &["--help"]);
    assert_eq!(code, 0);
    for flag in ["--old", "--new", "--bin", "--src", "--rebuild", "--dumps-dir"] {
        assert!(stdout.contains(flag), "missing {} in help", flag);
    }
}

#[test]
fn test_clean_dry_run_keeps_cache() {
    let dir = tempfile::tempdir().unwrap();
    let dump = dir.path().join("abi_dump/x86_64/libfoo/1.0/libfoo.so.1/ABI.dump");
    std::fs::create_dir_all(dump.parent().unwrap()).unwrap();
    std::fs::write(&dump, "$VAR1 = {};\n").unwrap();

    let (code, stdout, _) = run_in(dir.path(), &["clean", "--dry-run"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Dry run"), "stdout: {}", stdout);
    assert!(stdout.contains("1 file"), "stdout: {}", stdout);
    assert!(dump.exists());

    let (code, stdout, _) = run_in(dir.path(), &["clean"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Removed"), "stdout: {}", stdout);
    assert!(!dir.path().join("abi_dump").exists());
}

#[test]
fn test_clean_without_cache() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_in(dir.path(), &["clean", "--dumps-dir", "nowhere"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No ABI dump cache"), "stdout: {}", stdout);
}
