//! JSON reporter
//!
//! Writes the `meta.json` structured summary. Keys keep a fixed order and
//! percentages are rounded to two decimals, written as integers when whole.

use super::CompatReport;
use crate::models::format_percent;
use anyhow::Result;
use serde::{Serialize, Serializer};

/// Percentage rounded for presentation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percent(pub f64);

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rounded: f64 = format_percent(self.0).parse().unwrap_or(self.0);
        if rounded.fract() == 0.0 && rounded.abs() < i64::MAX as f64 {
            serializer.serialize_i64(rounded as i64)
        } else {
            serializer.serialize_f64(rounded)
        }
    }
}

/// Structured summary; field order is the key order on disk
#[derive(Debug, Serialize)]
pub struct Summary {
    #[serde(rename = "BC", skip_serializing_if = "Option::is_none")]
    pub bc: Option<Percent>,
    #[serde(rename = "Source_BC", skip_serializing_if = "Option::is_none")]
    pub source_bc: Option<Percent>,
    #[serde(rename = "Added")]
    pub added: u64,
    #[serde(rename = "Removed")]
    pub removed: u64,
    #[serde(rename = "TotalProblems", skip_serializing_if = "Option::is_none")]
    pub total_problems: Option<u64>,
    #[serde(rename = "Source_TotalProblems", skip_serializing_if = "Option::is_none")]
    pub source_total_problems: Option<u64>,
    #[serde(rename = "ObjectsAdded")]
    pub objects_added: usize,
    #[serde(rename = "ObjectsRemoved")]
    pub objects_removed: usize,
    #[serde(rename = "ChangedSoname")]
    pub changed_soname: usize,
}

impl Summary {
    pub fn from_report(report: &CompatReport) -> Self {
        let score = &report.score;
        Self {
            bc: score.binary.map(|s| Percent(s.compatibility)),
            source_bc: score.source.map(|s| Percent(s.compatibility)),
            added: score.added_symbols,
            removed: score.removed_symbols,
            total_problems: score.binary.map(|s| s.problems),
            source_total_problems: score.source.map(|s| s.problems),
            objects_added: score.objects_added,
            objects_removed: score.objects_removed,
            changed_soname: score.changed_soname,
        }
    }
}

/// Render the summary as pretty-printed JSON with a trailing newline
pub fn render(report: &CompatReport) -> Result<String> {
    let mut out = serde_json::to_string_pretty(&Summary::from_report(report))?;
    out.push('\n');
    Ok(out)
}
