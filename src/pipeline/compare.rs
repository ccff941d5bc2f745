//! Comparator invocations over mapped pairs
//!
//! Pairs are independent, so they run on a rayon pool. Results are collected
//! in mapping order before anything is aggregated.

use super::dump::DumpedRelease;
use super::Console;
use crate::error::AbidiffResult;
use crate::models::{CheckSelection, ObjectMapping};
use crate::reporters::text::object_line;
use crate::scoring::ComparedObject;
use crate::tools::{CompareRequest, ComparisonOutcome, Toolchain};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::Path;
use tracing::warn;

fn create_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .expect("valid template")
        .progress_chars("█▓▒░  ")
}

/// Inputs shared by every comparison of a run
pub struct CompareContext<'a> {
    pub tools: &'a Toolchain,
    pub old: &'a DumpedRelease,
    pub new: &'a DumpedRelease,
    pub selection: CheckSelection,
    pub report_dir: &'a Path,
    pub log: &'a Path,
    pub workers: usize,
}

fn compare_pair(
    ctx: &CompareContext<'_>,
    old_name: &str,
    new_name: &str,
    bar: &ProgressBar,
    console: &Console,
) -> Option<ComparedObject> {
    let old_descriptor = ctx.old.descriptor(old_name)?;
    let new_descriptor = ctx.new.descriptor(new_name)?;
    let request = CompareRequest {
        object: old_name.to_string(),
        old_descriptor: old_descriptor.clone(),
        new_descriptor: new_descriptor.clone(),
        kinds: ctx.selection.kinds(),
        report_dir: ctx.report_dir.to_path_buf(),
        log: Some(ctx.log.to_path_buf()),
    };

    let records = match ctx.tools.comparator.compare(&request) {
        ComparisonOutcome::Compared(records) => records,
        ComparisonOutcome::Failed { reason } => {
            warn!("Failed to create ABI report for {}: {}", old_name, reason);
            return None;
        }
    };

    let symbols = match ctx.tools.comparator.count_symbols(old_descriptor) {
        Ok(n) => n,
        Err(e) => {
            warn!("Can't count symbols of {} (old): {:#}", old_name, e);
            return None;
        }
    };

    if !console.quiet {
        bar.println(format!("{}: {}", old_name, object_line(&records)));
    }

    Some(ComparedObject {
        old: old_name.to_string(),
        new: new_name.to_string(),
        records,
        symbols,
    })
}

/// Compare every pair; pairs without usable output are dropped with a warning.
pub fn compare_all(
    ctx: &CompareContext<'_>,
    pairs: &[ObjectMapping],
    console: &Console,
) -> AbidiffResult<Vec<ComparedObject>> {
    let bar = if console.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(pairs.len() as u64);
        bar.set_style(create_bar_style());
        bar.set_message("Comparing ABI dumps");
        bar
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(ctx.workers)
        .build()
        .map_err(std::io::Error::other)?;

    let results: Vec<Option<ComparedObject>> = pool.install(|| {
        pairs
            .par_iter()
            .map(|m| {
                let result = compare_pair(ctx, &m.old, &m.new, &bar, console);
                bar.inc(1);
                result
            })
            .collect()
    });
    bar.finish_and_clear();

    Ok(results.into_iter().flatten().collect())
}
