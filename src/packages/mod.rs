//! Package classification and validation
//!
//! Turns the `--old` / `--new` path lists into validated [`PackageSet`]s:
//! the release and debug-info packages are required, a devel package is
//! optional but must be given on both sides.

pub mod discover;
pub mod system;

pub use system::SystemPackageTool;

use crate::error::{AbidiffError, AbidiffResult};
use crate::models::{Package, PackageAttrs, PackageFormat, PackageKind, PackageSet, Release};
use crate::tools::PackageTool;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::warn;

fn devel_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r".*-(headers-|devel-|dev-|dev_).*").expect("valid regex"))
}

fn debug_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r".*-(debuginfo-|dbg_).*").expect("valid regex"))
}

fn debug_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-(debuginfo|dbg)$").expect("valid regex"))
}

/// Role of a package judged from its file name
pub fn classify_kind(file_name: &str) -> PackageKind {
    if devel_re().is_match(file_name) {
        PackageKind::Devel
    } else if debug_re().is_match(file_name) {
        PackageKind::DebugInfo
    } else {
        PackageKind::Release
    }
}

/// Package name without its `-debuginfo` / `-dbg` suffix
pub fn base_package_name(name: &str) -> String {
    debug_suffix_re().replace(name, "").to_string()
}

/// Check access, detect format and kind, and read attributes of one package
pub fn identify(path: &Path, tool: &dyn PackageTool) -> AbidiffResult<Package> {
    if !path.exists() {
        return Err(AbidiffError::Inaccessible(path.to_path_buf()));
    }
    let format = PackageFormat::from_path(path)
        .ok_or_else(|| AbidiffError::UnknownFormat(path.to_path_buf()))?;
    let attrs = tool
        .attributes(path, format)
        .map_err(|e| AbidiffError::UnreadableAttributes {
            path: path.to_path_buf(),
            reason: format!("{:#}", e),
        })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(Package {
        path: path.to_path_buf(),
        format,
        kind: classify_kind(&file_name),
        attrs,
    })
}

/// Build the package set of one release
pub fn resolve_release(
    release: Release,
    paths: &[PathBuf],
    tool: &dyn PackageTool,
) -> AbidiffResult<PackageSet> {
    if paths.is_empty() {
        return Err(AbidiffError::MissingPackageList { release });
    }
    for path in paths {
        if !path.exists() {
            return Err(AbidiffError::Inaccessible(path.clone()));
        }
    }

    let mut binaries = None;
    let mut debug_info = None;
    let mut devel = None;
    for path in paths {
        let package = identify(path, tool)?;
        let slot = match package.kind {
            PackageKind::Release => &mut binaries,
            PackageKind::DebugInfo => &mut debug_info,
            PackageKind::Devel => &mut devel,
        };
        if let Some(previous) = slot.replace(package) {
            warn!(
                "More than one {} {} package given, ignoring {}",
                release,
                previous.kind,
                previous.file_name()
            );
        }
    }

    let binaries: Package = binaries.ok_or(AbidiffError::MissingPackage {
        release,
        kind: PackageKind::Release,
    })?;
    let debug_info: Package = debug_info.ok_or(AbidiffError::MissingPackage {
        release,
        kind: PackageKind::DebugInfo,
    })?;

    for other in std::iter::once(&debug_info).chain(devel.as_ref()) {
        if other.format != binaries.format {
            return Err(AbidiffError::ReleaseFormatMismatch {
                release,
                kind: other.kind,
                rel: binaries.format,
                other: other.format,
            });
        }
    }
    if binaries.attrs.arch != debug_info.attrs.arch {
        return Err(AbidiffError::ReleaseArchMismatch {
            release,
            rel: binaries.attrs.arch.clone(),
            debug: debug_info.attrs.arch.clone(),
        });
    }
    if binaries.attrs.version != debug_info.attrs.version {
        warn!(
            "Versions of {} release and debuginfo packages differ ({} vs {})",
            release, binaries.attrs.version, debug_info.attrs.version
        );
    }
    if let Some(d) = &devel {
        if d.attrs.arch != binaries.attrs.arch {
            warn!(
                "Architecture of {} devel package differs ({} vs {})",
                release, d.attrs.arch, binaries.attrs.arch
            );
        }
        if d.attrs.version != binaries.attrs.version {
            warn!(
                "Versions of {} release and devel packages differ ({} vs {})",
                release, binaries.attrs.version, d.attrs.version
            );
        }
    }

    let identity = PackageAttrs {
        name: base_package_name(&debug_info.attrs.name),
        version: debug_info.attrs.version.clone(),
        arch: debug_info.attrs.arch.clone(),
    };

    Ok(PackageSet {
        release,
        binaries,
        debug_info,
        devel,
        identity,
    })
}

/// Cross-release checks
pub fn validate_pair(old: &PackageSet, new: &PackageSet) -> AbidiffResult<()> {
    match (&old.devel, &new.devel) {
        (Some(_), None) => {
            return Err(AbidiffError::UnpairedDevel {
                present: Release::Old,
                missing: Release::New,
            })
        }
        (None, Some(_)) => {
            return Err(AbidiffError::UnpairedDevel {
                present: Release::New,
                missing: Release::Old,
            })
        }
        _ => {}
    }
    if old.binaries.format != new.binaries.format {
        return Err(AbidiffError::FormatMismatch {
            old: old.binaries.format,
            new: new.binaries.format,
        });
    }
    if old.identity.arch != new.identity.arch {
        return Err(AbidiffError::ArchMismatch {
            old: old.identity.arch.clone(),
            new: new.identity.arch.clone(),
        });
    }
    if old.identity.name != new.identity.name {
        warn!(
            "Names of old and new packages differ ({} vs {})",
            old.identity.name, new.identity.name
        );
    }
    Ok(())
}
