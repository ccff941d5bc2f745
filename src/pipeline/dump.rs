//! Descriptor generation with cache consult

use super::extract::ReleaseTree;
use super::Console;
use crate::cache::{descriptor_is_empty, ArtifactStore, CacheLookup, DumpKey};
use crate::error::{AbidiffError, AbidiffResult};
use crate::models::{PackageSet, SharedObject};
use crate::tools::{DumpRequest, ToolOutcome, Toolchain};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Per-object state after descriptor generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorState {
    Ready(PathBuf),
    /// Descriptor lists no symbols
    Empty(PathBuf),
    Failed(String),
}

/// Descriptors of one release
#[derive(Debug, Clone, Default)]
pub struct DumpedRelease {
    /// Objects with usable descriptors, in listing order
    pub ready: Vec<(SharedObject, PathBuf)>,
    pub empty: Vec<String>,
    pub failed: Vec<String>,
}

impl DumpedRelease {
    pub fn descriptor(&self, name: &str) -> Option<&PathBuf> {
        self.ready
            .iter()
            .find(|(o, _)| o.name == name)
            .map(|(_, p)| p)
    }

    pub fn is_usable(&self, name: &str) -> bool {
        self.descriptor(name).is_some()
    }

    /// Why an object has no usable descriptor, if it has none
    pub fn unusable_reason(&self, name: &str) -> Option<&'static str> {
        if self.is_usable(name) {
            None
        } else if self.empty.iter().any(|n| n == name) {
            Some("empty ABI dump")
        } else if self.failed.iter().any(|n| n == name) {
            Some("failed to create ABI dump")
        } else {
            Some("no ABI dump")
        }
    }
}

fn dump_object(
    set: &PackageSet,
    tree: &ReleaseTree,
    object: &SharedObject,
    store: &ArtifactStore,
    tools: &Toolchain,
    log: &Path,
    console: &Console,
) -> AbidiffResult<DescriptorState> {
    let key = DumpKey {
        arch: set.identity.arch.clone(),
        name: set.identity.name.clone(),
        version: set.identity.version.clone(),
        object: object.name.clone(),
    };
    let lookup = store.lookup(&key).map_err(|source| AbidiffError::Write {
        what: "ABI dump",
        path: store.path_for(&key),
        source,
    })?;

    let path = match lookup {
        CacheLookup::Hit(path) => path,
        CacheLookup::Miss(path) => {
            console.line(format!(
                "Creating ABI dump for {} ({})",
                object.name, set.release
            ));
            let request = DumpRequest {
                object: object.path.clone(),
                output: path,
                version: set.identity.version.clone(),
                debuginfo_dir: tree.debuginfo_dir.clone(),
                headers_dir: tree.headers_dir.clone(),
                log: Some(log.to_path_buf()),
            };
            match tools.extractor.dump(&request) {
                ToolOutcome::Produced(path) => path,
                ToolOutcome::Missing { reason } => return Ok(DescriptorState::Failed(reason)),
            }
        }
    };

    match descriptor_is_empty(&path) {
        Ok(true) => Ok(DescriptorState::Empty(path)),
        Ok(false) => Ok(DescriptorState::Ready(path)),
        Err(e) => Ok(DescriptorState::Failed(format!(
            "can't read '{}': {}",
            path.display(),
            e
        ))),
    }
}

/// Produce or reuse descriptors for every object of a release.
/// Failed and empty objects are logged and set aside.
pub fn dump_release(
    set: &PackageSet,
    tree: &ReleaseTree,
    store: &ArtifactStore,
    tools: &Toolchain,
    log: &Path,
    console: &Console,
) -> AbidiffResult<DumpedRelease> {
    let mut dumped = DumpedRelease::default();
    for object in &tree.objects {
        match dump_object(set, tree, object, store, tools, log, console)? {
            DescriptorState::Ready(path) => dumped.ready.push((object.clone(), path)),
            DescriptorState::Empty(_) => {
                warn!(
                    "Empty ABI dump for {} ({}), object skipped",
                    object.name, set.release
                );
                dumped.empty.push(object.name.clone());
            }
            DescriptorState::Failed(reason) => {
                warn!(
                    "Failed to create ABI dump for {} ({}): {}",
                    object.name, set.release, reason
                );
                dumped.failed.push(object.name.clone());
            }
        }
    }
    Ok(dumped)
}
