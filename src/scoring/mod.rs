//! Package-wide compatibility scoring
//!
//! Folds per-object comparator statistics into one score per check kind.
//!
//! # Scoring Formula
//!
//! ```text
//! Compatibility = 100 - Σ(affectedᵢ × symbolsᵢ) / Σ symbolsᵢ      (compared objects)
//!
//! With removed objects:
//!   Compatibility ×= 1 - removed_symbols / (Σ symbolsᵢ + removed_symbols)
//! ```
//!
//! The average is weighted by each object's live symbol count, so a small
//! broken helper library cannot dominate a package whose main library is
//! untouched. Removed objects never reach the comparator; the multiplicative
//! correction accounts for their symbols as fully lost.
//!
//! # Example
//!
//! `libfoo.so.1` (100 symbols, 5% affected) and a removed `libold.so`
//! (25 symbols):
//!
//! ```text
//! 100 - (5 × 100) / 100 = 95
//! 95 × (1 - 25 / 125)   = 76
//! ```
//!
//! All arithmetic stays in full precision; rounding happens only when a
//! score is printed.

use crate::models::{AggregateScore, CheckKind, CheckSelection, CompatibilityRecord, KindScore};

/// A mapped pair that the comparator produced usable statistics for
#[derive(Debug, Clone, PartialEq)]
pub struct ComparedObject {
    /// Old object basename
    pub old: String,
    pub new: String,
    pub records: Vec<CompatibilityRecord>,
    /// Live exported symbols of the old object
    pub symbols: u64,
}

impl ComparedObject {
    pub fn record(&self, kind: CheckKind) -> Option<&CompatibilityRecord> {
        self.records.iter().find(|r| r.kind == kind)
    }
}

/// Everything besides the compared pairs that feeds the aggregate
#[derive(Debug, Clone, Default)]
pub struct ObjectTotals {
    /// Symbols of old objects that were removed from the package
    pub removed_symbols: u64,
    pub objects_added: usize,
    pub objects_removed: usize,
    pub changed_soname: usize,
}

/// Fraction of symbols still present once removed objects are accounted for
pub fn survival_factor(compared_symbols: u64, removed_symbols: u64) -> f64 {
    let total = compared_symbols + removed_symbols;
    if total == 0 {
        return 1.0;
    }
    1.0 - removed_symbols as f64 / total as f64
}

fn score_kind(
    kind: CheckKind,
    compared: &[ComparedObject],
    total_symbols: u64,
    factor: f64,
) -> KindScore {
    let mut affected = 0.0;
    let mut problems = 0;
    for obj in compared {
        if let Some(rec) = obj.record(kind) {
            affected += rec.affected * obj.symbols as f64;
            problems += rec.problems;
        }
    }

    let mut compatibility = 100.0;
    if total_symbols > 0 {
        compatibility -= affected / total_symbols as f64;
    }
    KindScore {
        compatibility: compatibility * factor,
        problems,
    }
}

/// Aggregate per-object records into package-wide scores.
///
/// Added and removed symbol totals come from the primary check kind
/// (binary when it ran, source otherwise).
pub fn aggregate(
    compared: &[ComparedObject],
    totals: &ObjectTotals,
    selection: CheckSelection,
) -> AggregateScore {
    let total_symbols: u64 = compared.iter().map(|o| o.symbols).sum();
    let factor = if totals.objects_removed > 0 {
        survival_factor(total_symbols, totals.removed_symbols)
    } else {
        1.0
    };

    let primary = selection.primary();
    let (added_symbols, removed_symbols) = compared
        .iter()
        .filter_map(|o| o.record(primary))
        .fold((0, 0), |(a, r), rec| (a + rec.added, r + rec.removed));

    AggregateScore {
        binary: selection
            .binary
            .then(|| score_kind(CheckKind::Binary, compared, total_symbols, factor)),
        source: selection
            .source
            .then(|| score_kind(CheckKind::Source, compared, total_symbols, factor)),
        added_symbols,
        removed_symbols,
        objects_added: totals.objects_added,
        objects_removed: totals.objects_removed,
        changed_soname: totals.changed_soname,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tier;

    fn record(kind: CheckKind, affected: f64, problems: u64) -> CompatibilityRecord {
        CompatibilityRecord {
            kind,
            affected,
            problems,
            added: 0,
            removed: 0,
            report_path: String::new(),
        }
    }

    fn compared(name: &str, symbols: u64, affected: f64, problems: u64) -> ComparedObject {
        ComparedObject {
            old: name.to_string(),
            new: name.to_string(),
            records: vec![
                record(CheckKind::Binary, affected, problems),
                record(CheckKind::Source, affected, problems),
            ],
            symbols,
        }
    }

    #[test]
    fn test_single_object_five_percent() {
        let objs = vec![compared("libfoo.so.1", 100, 5.0, 3)];
        let totals = ObjectTotals {
            changed_soname: 1,
            ..Default::default()
        };
        let score = aggregate(&objs, &totals, CheckSelection::both());

        let bin = score.binary.unwrap();
        assert!((bin.compatibility - 95.0).abs() < 1e-9);
        assert_eq!(bin.problems, 3);
        assert_eq!(bin.tier(), Tier::Warning);
        assert_eq!(score.changed_soname, 1);
    }

    #[test]
    fn test_all_objects_removed_scores_zero() {
        let totals = ObjectTotals {
            removed_symbols: 50,
            objects_removed: 1,
            ..Default::default()
        };
        let score = aggregate(&[], &totals, CheckSelection::both());

        let bin = score.binary.unwrap();
        assert_eq!(bin.compatibility, 0.0);
        assert_eq!(bin.tier(), Tier::Incompatible);
        assert_eq!(score.source.unwrap().compatibility, 0.0);
    }

    #[test]
    fn test_unchanged_package_is_exactly_100() {
        let objs = vec![
            compared("liba.so.1", 1234, 0.0, 0),
            compared("libb.so.2", 7, 0.0, 0),
        ];
        let score = aggregate(&objs, &ObjectTotals::default(), CheckSelection::both());
        assert_eq!(score.binary.unwrap().compatibility, 100.0);
        assert_eq!(score.source.unwrap().compatibility, 100.0);
        assert_eq!(score.binary.unwrap().tier(), Tier::Ok);
    }

    #[test]
    fn test_weighted_by_symbols() {
        // A tiny, fully broken helper barely moves the score
        let objs = vec![
            compared("libmain.so.1", 990, 0.0, 0),
            compared("libhelper.so.1", 10, 100.0, 4),
        ];
        let score = aggregate(&objs, &ObjectTotals::default(), CheckSelection::both());
        assert!((score.binary.unwrap().compatibility - 99.0).abs() < 1e-9);
    }

    #[test]
    fn test_removed_object_penalty() {
        let objs = vec![compared("libfoo.so.1", 100, 5.0, 0)];
        let totals = ObjectTotals {
            removed_symbols: 25,
            objects_removed: 1,
            ..Default::default()
        };
        let score = aggregate(&objs, &totals, CheckSelection::from_flags(true, false));
        assert!((score.binary.unwrap().compatibility - 76.0).abs() < 1e-9);
        assert!(score.source.is_none());
    }

    #[test]
    fn test_monotonic_in_affected() {
        let mut previous = f64::INFINITY;
        for step in 0..=20 {
            let affected = step as f64 * 5.0;
            let objs = vec![
                compared("liba.so", 300, affected, 0),
                compared("libb.so", 700, 12.5, 0),
            ];
            let totals = ObjectTotals {
                removed_symbols: 40,
                objects_removed: 1,
                ..Default::default()
            };
            let c = aggregate(&objs, &totals, CheckSelection::both())
                .binary
                .unwrap()
                .compatibility;
            assert!(c <= previous);
            previous = c;
        }
    }

    #[test]
    fn test_added_removed_from_primary_kind() {
        let mut obj = compared("libfoo.so.1", 10, 0.0, 0);
        obj.records[0].added = 2;
        obj.records[1].added = 5;
        obj.records[1].removed = 1;

        let both = aggregate(&[obj.clone()], &ObjectTotals::default(), CheckSelection::both());
        assert_eq!((both.added_symbols, both.removed_symbols), (2, 0));

        let src = aggregate(
            &[obj],
            &ObjectTotals::default(),
            CheckSelection::from_flags(false, true),
        );
        assert_eq!((src.added_symbols, src.removed_symbols), (5, 1));
    }

    #[test]
    fn test_survival_factor_guards_zero() {
        assert_eq!(survival_factor(0, 0), 1.0);
        assert_eq!(survival_factor(0, 50), 0.0);
        assert_eq!(survival_factor(75, 25), 0.75);
    }
}
