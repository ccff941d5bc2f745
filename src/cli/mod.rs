//! CLI command definitions and handlers

mod clean;
mod compare;
mod doctor;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// Pkg-ABIdiff - check API/ABI compatibility of Linux packages
#[derive(Parser, Debug)]
#[command(name = "pkg-abidiff")]
#[command(
    version,
    args_conflicts_with_subcommands = true,
    about = "Check backward API/ABI compatibility of two versions of a Linux package (RPM or DEB)",
    long_about = "Pkg-ABIdiff unpacks the old and new releases of a package together with \
their debuginfo (and optionally devel) packages, dumps the ABI of every shared object \
with abi-dumper, pairs old objects with new ones and compares them with \
abi-compliance-checker.\n\n\
The result is a package-wide binary and source compatibility rate written to \
meta.json and a browsable index.html.",
    after_help = "\
Examples:
  pkg-abidiff --old libfoo-1.0.rpm libfoo-debuginfo-1.0.rpm \\
              --new libfoo-2.0.rpm libfoo-debuginfo-2.0.rpm
  pkg-abidiff --old OLD... --new NEW... --bin          Binary compatibility only
  pkg-abidiff --old OLD... --new NEW... -o report/     Explicit report directory
  pkg-abidiff --old OLD... --new NEW... --rebuild      Regenerate dumps and report
  pkg-abidiff doctor                                   Check external tools
  pkg-abidiff clean --dry-run                          Show what the cache holds"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel comparator workers (1-64, default: CPU count)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Suppress progress output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub compare: CompareArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Arguments of a comparison run
#[derive(Args, Debug, Clone, Default)]
pub struct CompareArgs {
    /// Old packages: release, debuginfo and optional devel
    #[arg(long, num_args = 1.., value_name = "PATH")]
    pub old: Vec<PathBuf>,

    /// New packages: release, debuginfo and optional devel
    #[arg(long, num_args = 1.., value_name = "PATH")]
    pub new: Vec<PathBuf>,

    /// Report directory (default: compat_report/ARCH/NAME/OLD_VER/NEW_VER)
    #[arg(long, short = 'o', value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Root of the ABI dump cache (default: abi_dump)
    #[arg(long, value_name = "DIR")]
    pub dumps_dir: Option<PathBuf>,

    /// Check binary compatibility only
    #[arg(long)]
    pub bin: bool,

    /// Check source compatibility only
    #[arg(long)]
    pub src: bool,

    /// Regenerate ABI dumps and the report
    #[arg(long)]
    pub rebuild: bool,

    /// Regenerate the report
    #[arg(long)]
    pub rebuild_report: bool,

    /// Regenerate ABI dumps
    #[arg(long)]
    pub rebuild_dumps: bool,

    /// Ignore tags listed in this file (abi-dumper -ignore-tags)
    #[arg(long, value_name = "PATH")]
    pub ignore_tags: Option<PathBuf>,

    /// Keep register and stack offset info (abi-dumper -keep-registers-and-offsets)
    #[arg(long)]
    pub keep_registers_and_offsets: bool,

    /// Use GCC translation units to list symbols (abi-dumper -use-tu-dump)
    #[arg(long)]
    pub use_tu_dump: bool,

    /// Headers to include first, with --use-tu-dump
    #[arg(long, value_name = "PATHS")]
    pub include_preamble: Option<String>,

    /// Extra include paths, with --use-tu-dump
    #[arg(long, value_name = "PATHS")]
    pub include_paths: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare old and new packages (default when no subcommand is given)
    Compare(CompareArgs),

    /// Check that the external tools are installed and recent enough
    Doctor,

    /// Remove the ABI dump cache
    Clean {
        /// Preview what would be removed without deleting
        #[arg(long)]
        dry_run: bool,

        /// Root of the ABI dump cache (default: abi_dump)
        #[arg(long, value_name = "DIR")]
        dumps_dir: Option<PathBuf>,
    },
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    let config = pkg_abidiff::config::load_config(&std::env::current_dir()?);

    match cli.command {
        Some(Commands::Compare(args)) => compare::run(&args, &config, cli.workers, cli.quiet),
        Some(Commands::Doctor) => doctor::run(&config),
        Some(Commands::Clean { dry_run, dumps_dir }) => {
            let root = dumps_dir.unwrap_or_else(|| config.paths.dumps_dir.clone());
            clean::run(&root, dry_run)
        }
        None => compare::run(&cli.compare, &config, cli.workers, cli.quiet),
    }
}
