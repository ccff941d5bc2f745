//! Fatal error taxonomy for a compatibility run
//!
//! Only conditions that abort the run live here. Per-object tool failures are
//! values (`ToolOutcome`, `ComparisonOutcome`) and never surface as errors
//! unless they leave nothing to compare.

use crate::models::{PackageFormat, PackageKind, Release};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AbidiffError {
    #[error("{release} packages are not specified (--{release} option)")]
    MissingPackageList { release: Release },

    #[error("can't access '{}'", .0.display())]
    Inaccessible(PathBuf),

    #[error("unknown format of package '{}' (expected .rpm or .deb)", .0.display())]
    UnknownFormat(PathBuf),

    #[error("can't read attributes of package '{}': {reason}", .path.display())]
    UnreadableAttributes { path: PathBuf, reason: String },

    #[error("{release} {kind} package is not specified")]
    MissingPackage { release: Release, kind: PackageKind },

    #[error("{present} devel package is specified but the {missing} one is not")]
    UnpairedDevel { present: Release, missing: Release },

    #[error("architectures of {release} release and debuginfo packages differ ({rel} vs {debug})")]
    ReleaseArchMismatch {
        release: Release,
        rel: String,
        debug: String,
    },

    #[error("formats of {release} release and {kind} packages differ ({rel} vs {other})")]
    ReleaseFormatMismatch {
        release: Release,
        kind: PackageKind,
        rel: PackageFormat,
        other: PackageFormat,
    },

    #[error("formats of old and new packages are not equal ({old} vs {new})")]
    FormatMismatch {
        old: PackageFormat,
        new: PackageFormat,
    },

    #[error("architectures of old and new packages are not equal ({old} vs {new})")]
    ArchMismatch { old: String, new: String },

    #[error("failed to extract {release} {kind} package '{}': {reason}", .path.display())]
    ExtractionFailed {
        release: Release,
        kind: PackageKind,
        path: PathBuf,
        reason: String,
    },

    #[error("shared objects are not found in {release} release package")]
    NoSharedObjects { release: Release },

    #[error("debuginfo files are not found in {release} debuginfo package")]
    NoDebugInfo { release: Release },

    #[error("{tool} not found: {reason}")]
    ToolUnavailable { tool: String, reason: String },

    #[error("the version of {tool} should be {required} or newer (found {found})")]
    ToolTooOld {
        tool: String,
        required: String,
        found: String,
    },

    #[error("failed to create ABI dumps for all {release} objects")]
    NoUsableDescriptors { release: Release },

    #[error("failed to create reports for objects ({attempted} pair(s) attempted)")]
    NoComparisonResults { attempted: usize },

    #[error("failed to render {what}: {reason}")]
    Render { what: &'static str, reason: String },

    #[error("failed to write {what} to '{}': {source}", .path.display())]
    Write {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AbidiffResult<T> = Result<T, AbidiffError>;
