//! Output reporters for compatibility results
//!
//! Supports three output formats:
//! - `text` - Terminal summary styled by tier
//! - `json` - `meta.json` structured summary
//! - `html` - `index.html` narrative report
//!
//! Every reporter is a pure function of [`CompatReport`]; nothing here reads
//! the clock or the filesystem, so identical inputs give identical bytes.

pub mod html;
pub mod json;
pub mod text;

use crate::matching::MatchResult;
use crate::models::{AggregateScore, CheckSelection, PackageAttrs};
use crate::scoring::ComparedObject;
use anyhow::Result;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

/// One row of the "Analyzed Packages" table
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedPackage {
    pub old: String,
    pub new: String,
    /// Files of interest found in the old package
    pub files: usize,
}

/// Everything a report is rendered from
#[derive(Debug, Clone)]
pub struct CompatReport {
    pub old: PackageAttrs,
    pub new: PackageAttrs,
    /// Headers were supplied, so only the public ABI was analyzed
    pub public_abi: bool,
    pub selection: CheckSelection,
    pub packages: Vec<AnalyzedPackage>,
    /// Old objects that had usable descriptors or a counterpart, in listing order
    pub old_objects: Vec<String>,
    /// New objects that had usable descriptors or a counterpart, in listing order
    pub new_objects: Vec<String>,
    pub matches: MatchResult,
    pub compared: Vec<ComparedObject>,
    pub score: AggregateScore,
}

impl CompatReport {
    pub fn compared(&self, old_name: &str) -> Option<&ComparedObject> {
        self.compared.iter().find(|c| c.old == old_name)
    }
}

/// Render a report using an OutputFormat enum
pub fn report_with_format(report: &CompatReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report),
        OutputFormat::Json => json::render(report),
        OutputFormat::Html => html::render(report),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{
        CheckKind, CompatibilityRecord, KindScore, MatchTier, ObjectMapping,
    };

    /// libfoo 1.0 -> 2.0: libfoo.so.1 bumped to libfoo.so.2 (5% affected),
    /// libold.so removed, libnew.so.1 added.
    pub(crate) fn test_report() -> CompatReport {
        let record = |kind: CheckKind, affected: f64| CompatibilityRecord {
            kind,
            affected,
            problems: 3,
            added: 2,
            removed: 0,
            report_path: format!("libfoo.so.1/{}", kind.report_file()),
        };

        CompatReport {
            old: PackageAttrs {
                name: "libfoo".into(),
                version: "1.0".into(),
                arch: "x86_64".into(),
            },
            new: PackageAttrs {
                name: "libfoo".into(),
                version: "2.0".into(),
                arch: "x86_64".into(),
            },
            public_abi: false,
            selection: CheckSelection::both(),
            packages: vec![
                AnalyzedPackage {
                    old: "libfoo-1.0-1.x86_64.rpm".into(),
                    new: "libfoo-2.0-1.x86_64.rpm".into(),
                    files: 2,
                },
                AnalyzedPackage {
                    old: "libfoo-debuginfo-1.0-1.x86_64.rpm".into(),
                    new: "libfoo-debuginfo-2.0-1.x86_64.rpm".into(),
                    files: 2,
                },
            ],
            old_objects: vec!["libfoo.so.1".into(), "libold.so".into()],
            new_objects: vec!["libfoo.so.2".into(), "libnew.so.1".into()],
            matches: MatchResult {
                mappings: vec![ObjectMapping {
                    old: "libfoo.so.1".into(),
                    new: "libfoo.so.2".into(),
                    tier: MatchTier::ShortName,
                    soname_change: Some(("libfoo.so.1".into(), "libfoo.so.2".into())),
                }],
                added: vec!["libnew.so.1".into()],
                removed: vec!["libold.so".into()],
            },
            compared: vec![ComparedObject {
                old: "libfoo.so.1".into(),
                new: "libfoo.so.2".into(),
                records: vec![record(CheckKind::Binary, 5.0), record(CheckKind::Source, 0.0)],
                symbols: 100,
            }],
            score: AggregateScore {
                binary: Some(KindScore {
                    compatibility: 76.0,
                    problems: 3,
                }),
                source: Some(KindScore {
                    compatibility: 80.0,
                    problems: 3,
                }),
                added_symbols: 2,
                removed_symbols: 0,
                objects_added: 1,
                objects_removed: 1,
                changed_soname: 1,
            },
        }
    }

    #[test]
    fn test_report_dispatch() {
        let r = test_report();
        assert!(report_with_format(&r, OutputFormat::Json)
            .unwrap()
            .contains("\"BC\""));
        assert!(report_with_format(&r, OutputFormat::Html)
            .unwrap()
            .starts_with("<!DOCTYPE html>"));
    }
}
