//! Clean command - remove the ABI dump cache

use anyhow::{Context, Result};
use pkg_abidiff::cache::ArtifactStore;
use std::path::Path;

pub fn run(root: &Path, dry_run: bool) -> Result<()> {
    if !root.exists() {
        println!("No ABI dump cache found at {}.", root.display());
        return Ok(());
    }

    let dumps = ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .build()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_some_and(|t| t.is_file()))
        .count();
    println!(
        "Found ABI dump cache: {} ({} file{})",
        root.display(),
        dumps,
        if dumps == 1 { "" } else { "s" }
    );

    if dry_run {
        println!("\nDry run - nothing removed. Run without --dry-run to delete.");
        return Ok(());
    }

    let store = ArtifactStore::new(root, false);
    store
        .clear()
        .with_context(|| format!("Failed to remove {}", root.display()))?;
    println!("Removed: {}", root.display());

    Ok(())
}
