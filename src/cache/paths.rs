//! Deterministic on-disk layout of descriptors and reports

use std::path::{Path, PathBuf};

/// File name of every cached descriptor
pub const DUMP_FILE: &str = "ABI.dump";
/// Narrative report of a run
pub const INDEX_FILE: &str = "index.html";
/// Structured summary of a run
pub const META_FILE: &str = "meta.json";

/// Get the descriptor path for an object: `<root>/<arch>/<name>/<version>/<object>/ABI.dump`
pub fn get_dump_path(root: &Path, arch: &str, name: &str, version: &str, object: &str) -> PathBuf {
    root.join(arch)
        .join(name)
        .join(version)
        .join(object)
        .join(DUMP_FILE)
}

/// Get the default report directory: `<root>/<arch>/<old-name>/<old-version>/<new-version>`
pub fn get_report_dir(
    root: &Path,
    arch: &str,
    old_name: &str,
    old_version: &str,
    new_version: &str,
) -> PathBuf {
    root.join(arch)
        .join(old_name)
        .join(old_version)
        .join(new_version)
}

/// Get the narrative report path inside a report directory.
pub fn get_index_path(report_dir: &Path) -> PathBuf {
    report_dir.join(INDEX_FILE)
}

/// Get the structured summary path inside a report directory.
pub fn get_meta_path(report_dir: &Path) -> PathBuf {
    report_dir.join(META_FILE)
}

/// Get the per-object comparator output directory.
pub fn get_object_report_dir(report_dir: &Path, object: &str) -> PathBuf {
    report_dir.join(object)
}

/// Sibling machine-readable summary of a comparator report: `x.html` -> `x.json`
pub fn get_stats_path(report: &Path) -> PathBuf {
    report.with_extension("json")
}
