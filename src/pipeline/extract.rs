//! Unpacking and object discovery for one release

use super::Console;
use crate::error::{AbidiffError, AbidiffResult};
use crate::models::{PackageKind, PackageSet, SharedObject};
use crate::objects::short_name;
use crate::packages::discover::{count_debuginfo, count_headers, shared_objects};
use crate::tools::Toolchain;
use crate::workspace::Workspace;
use std::path::PathBuf;
use tracing::debug;

/// What was found inside one release's packages
#[derive(Debug, Clone)]
pub struct ReleaseTree {
    /// Shared objects in case-insensitive basename order
    pub objects: Vec<SharedObject>,
    pub debuginfo_dir: PathBuf,
    pub headers_dir: Option<PathBuf>,
    pub debuginfo_files: usize,
    pub header_files: usize,
}

pub fn extract_release(
    set: &PackageSet,
    tools: &Toolchain,
    workspace: &Workspace,
    console: &Console,
) -> AbidiffResult<ReleaseTree> {
    for package in set.packages() {
        let dest = workspace.extract_dir(set.release, package.kind);
        debug!(
            "Extracting {} into {}",
            package.path.display(),
            dest.display()
        );
        tools
            .packages
            .extract(&package.path, package.format, &dest)
            .map_err(|e| AbidiffError::ExtractionFailed {
                release: set.release,
                kind: package.kind,
                path: package.path.clone(),
                reason: format!("{:#}", e),
            })?;
    }

    let rel_dir = workspace.extract_dir(set.release, PackageKind::Release);
    let debuginfo_dir = workspace.extract_dir(set.release, PackageKind::DebugInfo);
    let headers_dir = set
        .devel
        .as_ref()
        .map(|_| workspace.extract_dir(set.release, PackageKind::Devel));

    let paths = shared_objects(&rel_dir);
    if paths.is_empty() {
        return Err(AbidiffError::NoSharedObjects {
            release: set.release,
        });
    }

    let debuginfo_files = count_debuginfo(&debuginfo_dir, set.debug_info.format);
    if debuginfo_files == 0 {
        return Err(AbidiffError::NoDebugInfo {
            release: set.release,
        });
    }

    let header_files = headers_dir.as_deref().map(count_headers).unwrap_or(0);

    let objects: Vec<SharedObject> = paths
        .into_iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let soname = tools.inspector.soname(&path);
            SharedObject {
                short_name: short_name(&name),
                soname,
                name,
                path,
            }
        })
        .collect();

    console.line(format!(
        "Found {} shared object(s) in {} release",
        objects.len(),
        set.release
    ));

    Ok(ReleaseTree {
        objects,
        debuginfo_dir,
        headers_dir,
        debuginfo_files,
        header_files,
    })
}
