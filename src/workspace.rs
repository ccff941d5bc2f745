//! Scratch workspace owned by a run
//!
//! Packages are unpacked and tool logs written under a temporary directory
//! that is removed when the workspace is dropped. An interrupt removes it
//! too before the process exits.

use crate::models::{PackageKind, Release};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn create() -> std::io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("pkg-abidiff-").tempdir()?;
        debug!("Scratch workspace at {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `<scratch>/ext/<old|new>/<rel|debug|devel>`
    pub fn extract_dir(&self, release: Release, kind: PackageKind) -> PathBuf {
        self.path()
            .join("ext")
            .join(release.as_str())
            .join(kind.dir_name())
    }

    /// Log receiving the stdout of every tool invocation
    pub fn log_path(&self) -> PathBuf {
        self.path().join("log")
    }

    /// Remove the workspace and exit with status 130 on Ctrl-C.
    ///
    /// The signal is awaited on a dedicated thread running a current-thread
    /// runtime, so the synchronous pipeline is left untouched.
    pub fn cleanup_on_interrupt(&self) {
        let path = self.path().to_path_buf();
        let spawned = std::thread::Builder::new()
            .name("interrupt-cleanup".into())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        debug!("No interrupt handler: {}", e);
                        return;
                    }
                };
                if rt.block_on(tokio::signal::ctrl_c()).is_ok() {
                    let _ = std::fs::remove_dir_all(&path);
                    eprintln!("\nInterrupted, removed {}", path.display());
                    std::process::exit(130);
                }
            });
        if let Err(e) = spawned {
            debug!("No interrupt handler: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_and_cleanup() {
        let ws = Workspace::create().unwrap();
        let root = ws.path().to_path_buf();
        assert!(root.is_dir());
        assert_eq!(
            ws.extract_dir(Release::Old, PackageKind::DebugInfo),
            root.join("ext/old/debug")
        );
        assert_eq!(ws.log_path(), root.join("log"));

        drop(ws);
        assert!(!root.exists());
    }
}
