//! abi-compliance-checker wrapper
//!
//! The checker writes HTML reports whose first line is a statistics record:
//!
//! ```text
//! <!-- kind:binary;affected:5;added:0;removed:0;type_problems_high:1;...;tool_version:2.3 -->
//! ```
//!
//! That line is parsed once, here, into a [`CompatibilityRecord`]; a sibling
//! `.json` file with the same fields is written next to each report so
//! nothing downstream re-reads the HTML.

use super::external::{append_log, run_external_tool};
use super::versions::{require_version, ABI_CC_MIN_VERSION};
use super::{CompareRequest, Comparator, ComparisonOutcome};
use crate::cache::get_stats_path;
use crate::error::AbidiffResult;
use crate::models::{CheckKind, CompatibilityRecord};
use anyhow::Context;
use regex::Regex;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

fn stat_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\w+):([^\s]+)").expect("valid regex"))
}

fn counter(key: &str, value: &str) -> u64 {
    value.parse().unwrap_or_else(|_| {
        debug!("Ignoring unparsable counter {}:{}", key, value);
        0
    })
}

/// Parse a statistics record line into a typed record.
///
/// Problems are the sum of every `*_problems_*` counter plus
/// `changed_constants`. Returns `None` when `affected` is absent or not a
/// finite number.
pub fn parse_stat_line(
    line: &str,
    kind: CheckKind,
    report_path: &str,
) -> Option<CompatibilityRecord> {
    let mut affected = None;
    let mut added = 0u64;
    let mut removed = 0u64;
    let mut problems = 0u64;

    for piece in line.split(';') {
        let Some(caps) = stat_re().captures(piece) else {
            continue;
        };
        let key = &caps[1];
        let value = &caps[2];
        match key {
            "affected" => affected = value.parse::<f64>().ok().filter(|v| v.is_finite()),
            "added" => added = counter(key, value),
            "removed" => removed = counter(key, value),
            k if k.contains("_problems_") || k == "changed_constants" => {
                problems += counter(k, value);
            }
            _ => {}
        }
    }

    Some(CompatibilityRecord {
        kind,
        affected: affected?,
        problems,
        added,
        removed,
        report_path: report_path.to_string(),
    })
}

pub struct AbiComplianceChecker {
    program: String,
    timeout_secs: u64,
}

impl AbiComplianceChecker {
    pub fn new(program: &str, timeout_secs: u64) -> Self {
        Self {
            program: program.to_string(),
            timeout_secs,
        }
    }

    pub fn command(&self, request: &CompareRequest) -> Vec<String> {
        let object_dir = request.object_dir();
        let mut cmd = vec![
            self.program.clone(),
            "-l".to_string(),
            request.object.clone(),
            "-component".to_string(),
            "object".to_string(),
        ];
        for kind in &request.kinds {
            let (flag, path_flag) = match kind {
                CheckKind::Binary => ("-bin", "-bin-report-path"),
                CheckKind::Source => ("-src", "-src-report-path"),
            };
            cmd.push(flag.to_string());
            cmd.push(path_flag.to_string());
            cmd.push(object_dir.join(kind.report_file()).to_string_lossy().to_string());
        }
        cmd.push("-old".to_string());
        cmd.push(request.old_descriptor.to_string_lossy().to_string());
        cmd.push("-new".to_string());
        cmd.push(request.new_descriptor.to_string_lossy().to_string());
        cmd
    }
}

fn read_record(report: &Path, kind: CheckKind, link: &str) -> anyhow::Result<CompatibilityRecord> {
    let file = std::fs::File::open(report)
        .with_context(|| format!("no report at '{}'", report.display()))?;
    let mut first = String::new();
    BufReader::new(file).read_line(&mut first)?;
    let record = parse_stat_line(&first, kind, link)
        .with_context(|| format!("no statistics in '{}'", report.display()))?;

    let stats = get_stats_path(report);
    let json = serde_json::to_string_pretty(&record)?;
    std::fs::write(&stats, json)
        .with_context(|| format!("failed to write '{}'", stats.display()))?;
    Ok(record)
}

impl Comparator for AbiComplianceChecker {
    fn check_version(&self) -> AbidiffResult<()> {
        require_version(&self.program, ABI_CC_MIN_VERSION).map(|_| ())
    }

    fn compare(&self, request: &CompareRequest) -> ComparisonOutcome {
        let object_dir = request.object_dir();
        if object_dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(&object_dir) {
                return ComparisonOutcome::Failed {
                    reason: format!("can't remove '{}': {}", object_dir.display(), e),
                };
            }
        }

        let cmd = self.command(request);
        let result = run_external_tool(&cmd, "abi-compliance-checker", self.timeout_secs, None);
        if let Some(log) = &request.log {
            append_log(log, "abi-compliance-checker", &result);
        }

        let mut records = Vec::with_capacity(request.kinds.len());
        for kind in &request.kinds {
            let report = object_dir.join(kind.report_file());
            match read_record(&report, *kind, &request.report_link(*kind)) {
                Ok(record) => records.push(record),
                Err(e) => {
                    let reason = if result.exited_cleanly() {
                        format!("{:#}", e)
                    } else {
                        format!("{:#} ({})", e, result.describe_failure())
                    };
                    return ComparisonOutcome::Failed { reason };
                }
            }
        }
        ComparisonOutcome::Compared(records)
    }

    fn count_symbols(&self, descriptor: &Path) -> anyhow::Result<u64> {
        let cmd = vec![
            self.program.clone(),
            "-count-symbols".to_string(),
            descriptor.to_string_lossy().to_string(),
        ];
        let result = run_external_tool(&cmd, "abi-compliance-checker", self.timeout_secs, None);
        if !result.exited_cleanly() {
            anyhow::bail!(
                "can't count symbols in '{}': {}",
                descriptor.display(),
                result.describe_failure()
            );
        }
        result
            .stdout
            .trim()
            .parse()
            .with_context(|| format!("bad symbol count {:?}", result.stdout.trim()))
    }
}
