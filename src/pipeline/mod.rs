//! Compatibility run pipeline
//!
//! Orchestrates one old-vs-new comparison:
//! 1. Classify and validate the package lists of both releases
//! 2. Short-circuit when a report already exists
//! 3. Check tool versions, unpack packages and discover shared objects
//! 4. Produce or reuse ABI descriptors
//! 5. Match old objects to new ones
//! 6. Run the comparator on mapped pairs (in parallel)
//! 7. Aggregate and write `meta.json` and `index.html`
//!
//! Stages run strictly in sequence; all run state lives in values passed
//! between them.

mod compare;
mod dump;
mod extract;

pub use compare::CompareContext;
pub use dump::{DescriptorState, DumpedRelease};
pub use extract::ReleaseTree;

use crate::cache::{get_index_path, get_meta_path, get_report_dir, ArtifactStore};
use crate::error::{AbidiffError, AbidiffResult};
use crate::matching::match_objects_where;
use crate::models::{AggregateScore, CheckSelection, PackageSet, Release};
use crate::packages::{resolve_release, validate_pair};
use crate::reporters::{self, AnalyzedPackage, CompatReport, OutputFormat};
use crate::scoring::{aggregate, ObjectTotals};
use crate::tools::Toolchain;
use crate::workspace::Workspace;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Operator-facing progress output
#[derive(Debug, Clone, Copy, Default)]
pub struct Console {
    pub quiet: bool,
}

impl Console {
    pub fn line(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            println!("{}", msg.as_ref());
        }
    }
}

/// Everything a run needs besides its tools and scratch space
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub old: Vec<PathBuf>,
    pub new: Vec<PathBuf>,
    /// Explicit report directory; derived under `report_root` when absent
    pub report_dir: Option<PathBuf>,
    pub report_root: PathBuf,
    pub dumps_dir: PathBuf,
    pub selection: CheckSelection,
    pub rebuild_dumps: bool,
    pub rebuild_report: bool,
    pub workers: usize,
    pub quiet: bool,
}

/// How a run ended, when it did not fail
#[derive(Debug)]
pub enum RunOutcome {
    /// Reports were written
    Completed {
        report_dir: PathBuf,
        report: Box<CompatReport>,
    },
    /// A report was already present and no rebuild was requested
    ReportExists { report_dir: PathBuf },
    /// Every old object had an empty descriptor
    NothingToCompare,
}

fn report_dir_for(options: &RunOptions, old: &PackageSet, new: &PackageSet) -> PathBuf {
    options.report_dir.clone().unwrap_or_else(|| {
        get_report_dir(
            &options.report_root,
            &old.identity.arch,
            &old.identity.name,
            &old.identity.version,
            &new.identity.version,
        )
    })
}

fn remove_if_exists(path: &Path) -> AbidiffResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn write_output(
    report_dir: &Path,
    file: PathBuf,
    what: &'static str,
    content: String,
) -> AbidiffResult<()> {
    std::fs::create_dir_all(report_dir).map_err(|source| AbidiffError::Write {
        what,
        path: report_dir.to_path_buf(),
        source,
    })?;
    std::fs::write(&file, content).map_err(|source| AbidiffError::Write {
        what,
        path: file,
        source,
    })
}

fn render(
    report: &CompatReport,
    format: OutputFormat,
    what: &'static str,
) -> AbidiffResult<String> {
    reporters::report_with_format(report, format).map_err(|e| AbidiffError::Render {
        what,
        reason: format!("{:#}", e),
    })
}

fn analyzed_packages(
    old: &PackageSet,
    new: &PackageSet,
    old_tree: &ReleaseTree,
) -> Vec<AnalyzedPackage> {
    let mut rows = vec![
        AnalyzedPackage {
            old: old.binaries.file_name(),
            new: new.binaries.file_name(),
            files: old_tree.objects.len(),
        },
        AnalyzedPackage {
            old: old.debug_info.file_name(),
            new: new.debug_info.file_name(),
            files: old_tree.debuginfo_files,
        },
    ];
    if let (Some(o), Some(n)) = (&old.devel, &new.devel) {
        rows.push(AnalyzedPackage {
            old: o.file_name(),
            new: n.file_name(),
            files: old_tree.header_files,
        });
    }
    rows
}

/// Objects shown in the report: usable ones plus mapped ones whose
/// descriptor could not be used
fn listed_objects(
    tree: &ReleaseTree,
    dumps: &DumpedRelease,
    mapped: impl Fn(&str) -> bool,
) -> Vec<String> {
    tree.objects
        .iter()
        .filter(|o| dumps.is_usable(&o.name) || mapped(o.name.as_str()))
        .map(|o| o.name.clone())
        .collect()
}

/// Run one comparison end to end
pub fn run(
    options: &RunOptions,
    tools: &Toolchain,
    workspace: &Workspace,
) -> AbidiffResult<RunOutcome> {
    let console = Console {
        quiet: options.quiet,
    };

    let old = resolve_release(Release::Old, &options.old, tools.packages.as_ref())?;
    let new = resolve_release(Release::New, &options.new, tools.packages.as_ref())?;
    validate_pair(&old, &new)?;

    let report_dir = report_dir_for(options, &old, &new);
    let index_path = get_index_path(&report_dir);
    let meta_path = get_meta_path(&report_dir);
    if options.rebuild_report {
        remove_if_exists(&index_path)?;
        remove_if_exists(&meta_path)?;
    } else if index_path.exists() {
        console.line(format!("The report already exists: {}", report_dir.display()));
        return Ok(RunOutcome::ReportExists { report_dir });
    }

    tools.preflight()?;

    console.line("Extracting packages ...");
    let old_tree = extract::extract_release(&old, tools, workspace, &console)?;
    let new_tree = extract::extract_release(&new, tools, workspace, &console)?;

    let store = ArtifactStore::new(&options.dumps_dir, options.rebuild_dumps);
    let log = workspace.log_path();
    let old_dumps = dump::dump_release(&old, &old_tree, &store, tools, &log, &console)?;
    let new_dumps = dump::dump_release(&new, &new_tree, &store, tools, &log, &console)?;

    if old_dumps.ready.is_empty() {
        if old_dumps.failed.is_empty() {
            console.line("Nothing to compare: all old ABI dumps are empty");
            info!("All {} old objects have empty ABI dumps", old_dumps.empty.len());
            return Ok(RunOutcome::NothingToCompare);
        }
        return Err(AbidiffError::NoUsableDescriptors {
            release: Release::Old,
        });
    }
    if new_dumps.ready.is_empty() && !new_dumps.failed.is_empty() {
        return Err(AbidiffError::NoUsableDescriptors {
            release: Release::New,
        });
    }

    let mut matches = match_objects_where(
        &old_tree.objects,
        &new_tree.objects,
        |o| old_dumps.is_usable(&o.name),
        |o| new_dumps.is_usable(&o.name),
    );
    matches.retain_usable(|n| old_dumps.is_usable(n), |n| new_dumps.is_usable(n));

    let mut pairs = Vec::with_capacity(matches.mappings.len());
    for m in &matches.mappings {
        if let Some((from, to)) = &m.soname_change {
            warn!("SONAME of {} changed from {} to {}", m.old, from, to);
        } else if m.is_rename() {
            info!("{} was renamed to {}", m.old, m.new);
        }
        let unusable = old_dumps
            .unusable_reason(&m.old)
            .map(|r| (Release::Old, r))
            .or_else(|| new_dumps.unusable_reason(&m.new).map(|r| (Release::New, r)));
        match unusable {
            Some((release, reason)) => warn!(
                "Skipping {} -> {}: {} ({}), object not compared",
                m.old, m.new, reason, release
            ),
            None => pairs.push(m.clone()),
        }
    }

    std::fs::create_dir_all(&report_dir).map_err(|source| AbidiffError::Write {
        what: "report directory",
        path: report_dir.clone(),
        source,
    })?;

    let ctx = CompareContext {
        tools,
        old: &old_dumps,
        new: &new_dumps,
        selection: options.selection,
        report_dir: &report_dir,
        log: &log,
        workers: options.workers.max(1),
    };
    let compared = compare::compare_all(&ctx, &pairs, &console)?;
    if compared.is_empty() && !pairs.is_empty() {
        return Err(AbidiffError::NoComparisonResults {
            attempted: pairs.len(),
        });
    }

    let mut removed_symbols = 0;
    for name in &matches.removed {
        let Some(descriptor) = old_dumps.descriptor(name) else {
            continue;
        };
        match tools.comparator.count_symbols(descriptor) {
            Ok(n) => removed_symbols += n,
            Err(e) => warn!("Can't count symbols of removed {}: {:#}", name, e),
        }
    }

    let totals = ObjectTotals {
        removed_symbols,
        objects_added: matches.added.len(),
        objects_removed: matches.removed.len(),
        changed_soname: matches.soname_changes(),
    };
    let score: AggregateScore = aggregate(&compared, &totals, options.selection);

    let report = CompatReport {
        packages: analyzed_packages(&old, &new, &old_tree),
        old: old.identity.clone(),
        new: new.identity.clone(),
        public_abi: old.devel.is_some(),
        selection: options.selection,
        old_objects: listed_objects(&old_tree, &old_dumps, |n| matches.mapping_for(n).is_some()),
        new_objects: listed_objects(&new_tree, &new_dumps, |n| {
            matches.mappings.iter().any(|m| m.new == n)
        }),
        matches,
        compared,
        score,
    };

    let meta = render(&report, OutputFormat::Json, "meta.json")?;
    write_output(&report_dir, meta_path, "meta.json", meta)?;
    let html = render(&report, OutputFormat::Html, "index.html")?;
    write_output(&report_dir, index_path, "index.html", html)?;

    console.line(format!("The report has been generated to: {}", report_dir.display()));
    if !console.quiet {
        print!("{}", render(&report, OutputFormat::Text, "summary")?);
    }

    Ok(RunOutcome::Completed {
        report_dir,
        report: Box::new(report),
    })
}
