//! File discovery inside extracted packages

use crate::models::PackageFormat;
use crate::objects::{is_debug_file, is_shared_object, sort_key};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Regular files under `root`, symlinks excluded.
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .follow_links(false)
        .build();

    let mut files = Vec::new();
    for entry in walker.flatten() {
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file && !entry.path_is_symlink() {
            files.push(entry.path().to_path_buf());
        }
    }
    files
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

/// Shared objects of a release package, in case-insensitive basename order
pub fn shared_objects(root: &Path) -> Vec<PathBuf> {
    let mut objects: Vec<PathBuf> = list_files(root)
        .into_iter()
        .filter(|p| is_shared_object(file_name(p)))
        .collect();
    objects.sort_by_key(|p| (sort_key(file_name(p)), p.clone()));
    objects
}

/// Number of debug symbol files in a debug-info package.
/// Debian debug packages may also carry unstripped `lib*.so*` files.
pub fn count_debuginfo(root: &Path, format: PackageFormat) -> usize {
    list_files(root)
        .iter()
        .filter(|p| {
            let name = file_name(p);
            is_debug_file(name) || (format == PackageFormat::Deb && is_shared_object(name))
        })
        .count()
}

/// Number of header files in a devel package (pkg-config files excluded)
pub fn count_headers(root: &Path) -> usize {
    list_files(root)
        .iter()
        .filter(|p| !file_name(p).ends_with(".pc"))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_shared_objects_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "usr/lib64/libzeta.so.2.0.0");
        touch(dir.path(), "usr/lib64/libAlpha.so.1");
        touch(dir.path(), "usr/lib64/libbeta.a");
        touch(dir.path(), "usr/share/doc/README");

        let names: Vec<String> = shared_objects(dir.path())
            .iter()
            .map(|p| file_name(p).to_string())
            .collect();
        assert_eq!(names, vec!["libAlpha.so.1", "libzeta.so.2.0.0"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_skipped() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "usr/lib64/libfoo.so.1.0");
        std::os::unix::fs::symlink(
            "libfoo.so.1.0",
            dir.path().join("usr/lib64/libfoo.so.1"),
        )
        .unwrap();

        assert_eq!(shared_objects(dir.path()).len(), 1);
    }

    #[test]
    fn test_count_debuginfo() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "usr/lib/debug/usr/lib64/libfoo.so.1.0-1.0.debug");
        touch(dir.path(), "usr/lib/debug/.build-id/ab/cdef");
        touch(dir.path(), "usr/lib/debug/usr/lib/libfoo.so.1");

        assert_eq!(count_debuginfo(dir.path(), PackageFormat::Rpm), 1);
        assert_eq!(count_debuginfo(dir.path(), PackageFormat::Deb), 2);
    }

    #[test]
    fn test_count_headers_skips_pkgconfig() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "usr/include/foo.h");
        touch(dir.path(), "usr/include/foo/bar.h");
        touch(dir.path(), "usr/lib64/pkgconfig/foo.pc");

        assert_eq!(count_headers(dir.path()), 2);
    }
}
