//! Compare command - the default comparison run

use super::CompareArgs;
use anyhow::{Context, Result};
use console::style;
use pkg_abidiff::config::AbidiffConfig;
use pkg_abidiff::models::CheckSelection;
use pkg_abidiff::pipeline::{self, RunOptions, RunOutcome};
use pkg_abidiff::tools::{DumperOptions, Toolchain};
use pkg_abidiff::workspace::Workspace;
use tracing::debug;

fn dumper_options(args: &CompareArgs) -> DumperOptions {
    DumperOptions {
        ignore_tags: args.ignore_tags.clone(),
        keep_registers_and_offsets: args.keep_registers_and_offsets,
        use_tu_dump: args.use_tu_dump,
        include_preamble: args.include_preamble.clone(),
        include_paths: args.include_paths.clone(),
    }
}

/// Merge CLI flags over the loaded configuration
pub(crate) fn run_options(
    args: &CompareArgs,
    config: &AbidiffConfig,
    workers: Option<usize>,
    quiet: bool,
) -> RunOptions {
    RunOptions {
        old: args.old.clone(),
        new: args.new.clone(),
        report_dir: args.report_dir.clone(),
        report_root: config.paths.report_dir.clone(),
        dumps_dir: args
            .dumps_dir
            .clone()
            .unwrap_or_else(|| config.paths.dumps_dir.clone()),
        selection: CheckSelection::from_flags(args.bin, args.src),
        rebuild_dumps: args.rebuild || args.rebuild_dumps,
        rebuild_report: args.rebuild || args.rebuild_report,
        workers: workers
            .unwrap_or_else(|| config.workers())
            .clamp(1, 64),
        quiet,
    }
}

pub fn run(
    args: &CompareArgs,
    config: &AbidiffConfig,
    workers: Option<usize>,
    quiet: bool,
) -> Result<()> {
    let options = run_options(args, config, workers, quiet);
    let tools = Toolchain::system(&config.tools, dumper_options(args));

    let workspace = Workspace::create().context("Failed to create a temporary directory")?;
    debug!("Workspace: {}", workspace.path().display());
    workspace.cleanup_on_interrupt();

    match pipeline::run(&options, &tools, &workspace)? {
        RunOutcome::Completed { report, .. } => {
            debug!(
                "Compared {} of {} mapped object(s)",
                report.compared.len(),
                report.matches.mappings.len()
            );
        }
        RunOutcome::ReportExists { report_dir } => {
            debug!("Skipped, report present in {}", report_dir.display());
        }
        RunOutcome::NothingToCompare => {
            if !quiet {
                println!("{}", style("No ABI to compare").yellow());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_run_options_defaults() {
        let args = CompareArgs {
            old: vec![PathBuf::from("a.rpm")],
            new: vec![PathBuf::from("b.rpm")],
            ..Default::default()
        };
        let config = AbidiffConfig::default();
        let options = run_options(&args, &config, Some(3), false);

        assert_eq!(options.dumps_dir, PathBuf::from("abi_dump"));
        assert_eq!(options.report_root, PathBuf::from("compat_report"));
        assert!(options.report_dir.is_none());
        assert_eq!(options.selection, CheckSelection::both());
        assert!(!options.rebuild_dumps);
        assert!(!options.rebuild_report);
        assert_eq!(options.workers, 3);
    }

    #[test]
    fn test_rebuild_implies_both() {
        let args = CompareArgs {
            rebuild: true,
            bin: true,
            dumps_dir: Some(PathBuf::from("/tmp/dumps")),
            ..Default::default()
        };
        let options = run_options(&args, &AbidiffConfig::default(), None, true);

        assert!(options.rebuild_dumps);
        assert!(options.rebuild_report);
        assert!(options.selection.binary);
        assert!(!options.selection.source);
        assert_eq!(options.dumps_dir, PathBuf::from("/tmp/dumps"));
        assert!(options.workers >= 1);
    }

    #[test]
    fn test_dumper_options_passthrough() {
        let args = CompareArgs {
            use_tu_dump: true,
            include_paths: Some("/usr/include/foo".to_string()),
            ..Default::default()
        };
        let options = dumper_options(&args);
        assert!(options.use_tu_dump);
        assert_eq!(options.include_paths.as_deref(), Some("/usr/include/foo"));
        assert!(options.ignore_tags.is_none());
    }
}
