//! Text (terminal) reporter styled by compatibility tier

use super::CompatReport;
use crate::models::{format_percent, CheckKind, CompatibilityRecord, Tier};
use anyhow::Result;
use console::style;

/// Percentage styled by its tier
fn styled_percent(rate: f64, problems: u64) -> String {
    let text = format!("{}%", format_percent(rate));
    match Tier::classify(rate, problems) {
        Tier::Ok => style(text).green().bold().to_string(),
        Tier::Warning => style(text).yellow().bold().to_string(),
        Tier::Incompatible => style(text).red().bold().to_string(),
    }
}

/// Per-object console line, e.g. `BC: 95%, SC: 100%`
pub fn object_line(records: &[CompatibilityRecord]) -> String {
    records
        .iter()
        .map(|r| {
            format!(
                "{}: {}",
                r.kind.label(),
                styled_percent(r.compatibility(), r.problems)
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the package-wide summary line
pub fn render(report: &CompatReport) -> Result<String> {
    let parts: Vec<String> = [CheckKind::Binary, CheckKind::Source]
        .into_iter()
        .filter_map(|kind| {
            report.score.get(kind).map(|s| {
                format!(
                    "Avg. {}: {}",
                    kind.label(),
                    styled_percent(s.compatibility, s.problems)
                )
            })
        })
        .collect();
    Ok(format!("{}\n", parts.join(", ")))
}
