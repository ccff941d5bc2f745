//! Artifact store for ABI descriptors
//!
//! Descriptors are keyed by (architecture, package name, package version,
//! object basename) and live at a deterministic path under the dumps root.
//! Invalidation is all-or-nothing: either the run was asked to rebuild, in
//! which case every consulted entry is deleted and regenerated, or every
//! present entry is reused. Content and timestamps are never inspected,
//! since the output depends on tool versions the store cannot see.

pub mod paths;

pub use paths::{
    get_dump_path, get_index_path, get_meta_path, get_object_report_dir, get_report_dir,
    get_stats_path,
};

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Cache key of one descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DumpKey {
    pub arch: String,
    pub name: String,
    pub version: String,
    pub object: String,
}

/// Result of consulting the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// A descriptor is present and may be reused
    Hit(PathBuf),
    /// The extractor must write a descriptor to this path
    Miss(PathBuf),
}

impl CacheLookup {
    pub fn path(&self) -> &Path {
        match self {
            CacheLookup::Hit(p) | CacheLookup::Miss(p) => p,
        }
    }
}

/// Descriptor cache rooted at a dumps directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    rebuild: bool,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>, rebuild: bool) -> Self {
        Self {
            root: root.into(),
            rebuild,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &DumpKey) -> PathBuf {
        get_dump_path(&self.root, &key.arch, &key.name, &key.version, &key.object)
    }

    /// Consult the store before running the extractor.
    ///
    /// With rebuild set an existing descriptor is deleted so the caller
    /// regenerates it. The parent directory of a miss is created.
    pub fn lookup(&self, key: &DumpKey) -> std::io::Result<CacheLookup> {
        let path = self.path_for(key);
        if path.exists() {
            if !self.rebuild {
                debug!("Reusing descriptor {}", path.display());
                return Ok(CacheLookup::Hit(path));
            }
            debug!("Discarding descriptor {}", path.display());
            std::fs::remove_file(&path)?;
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(CacheLookup::Miss(path))
    }

    /// Remove the whole store. Returns false when there was nothing to remove.
    pub fn clear(&self) -> std::io::Result<bool> {
        if !self.root.exists() {
            return Ok(false);
        }
        std::fs::remove_dir_all(&self.root)?;
        Ok(true)
    }
}

/// Whether a descriptor lists no exported symbols.
///
/// The first line mentioning `'SymbolInfo'` decides: an empty table is
/// written as `'SymbolInfo' => {}`.
pub fn descriptor_is_empty(path: &Path) -> std::io::Result<bool> {
    let reader = BufReader::new(std::fs::File::open(path)?);
    for line in reader.lines() {
        let line = line?;
        if line.contains("'SymbolInfo'") {
            return Ok(line.contains("'SymbolInfo' => {}"));
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key() -> DumpKey {
        DumpKey {
            arch: "x86_64".into(),
            name: "libfoo".into(),
            version: "1.0-1".into(),
            object: "libfoo.so.1".into(),
        }
    }

    #[test]
    fn test_lookup_miss_creates_parent() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path(), false);

        let lookup = store.lookup(&key()).unwrap();
        assert!(matches!(lookup, CacheLookup::Miss(_)));
        assert!(lookup.path().parent().unwrap().is_dir());
        assert!(!lookup.path().exists());
    }

    #[test]
    fn test_lookup_hit_reuses() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path(), false);
        let path = store.path_for(&key());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "dump").unwrap();

        assert_eq!(store.lookup(&key()).unwrap(), CacheLookup::Hit(path.clone()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "dump");
    }

    #[test]
    fn test_lookup_rebuild_deletes() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path(), true);
        let path = store.path_for(&key());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale").unwrap();

        assert_eq!(store.lookup(&key()).unwrap(), CacheLookup::Miss(path.clone()));
        assert!(!path.exists());
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("abi_dump");
        let store = ArtifactStore::new(&root, false);
        assert!(!store.clear().unwrap());

        store.lookup(&key()).unwrap();
        assert!(store.clear().unwrap());
        assert!(!root.exists());
    }

    #[test]
    fn test_descriptor_is_empty() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("empty.dump");
        std::fs::write(&empty, "$VAR1 = {\n  'SymbolInfo' => {},\n  'TypeInfo' => {}\n};\n").unwrap();
        assert!(descriptor_is_empty(&empty).unwrap());

        let full = dir.path().join("full.dump");
        std::fs::write(
            &full,
            "$VAR1 = {\n  'SymbolInfo' => {\n    '1' => { 'ShortName' => 'foo' }\n  },\n};\n",
        )
        .unwrap();
        assert!(!descriptor_is_empty(&full).unwrap());
    }
}
