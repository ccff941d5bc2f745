//! Object matcher
//!
//! Pairs old shared objects with new ones. Each old object is offered to an
//! ordered chain of strategies (SONAME, exact basename, short name); the
//! first strategy that finds exactly one unclaimed candidate wins. When no
//! mapping is found at all and each side holds a single object, the two are
//! paired anyway and the mapping is recorded as a rename.
//!
//! Every old object ends up mapped or removed, every new object mapped or
//! added, and no object is used twice.

use crate::models::{MatchTier, ObjectMapping, SharedObject};

/// Returns the index of the unique new object this strategy accepts
type Strategy = fn(&SharedObject, &[SharedObject]) -> Option<usize>;

const STRATEGIES: [(MatchTier, Strategy); 3] = [
    (MatchTier::Soname, by_soname),
    (MatchTier::Basename, by_basename),
    (MatchTier::ShortName, by_short_name),
];

/// Index of the only element satisfying `pred`
fn unique_index(new: &[SharedObject], pred: impl Fn(&SharedObject) -> bool) -> Option<usize> {
    let mut hits = new.iter().enumerate().filter(|(_, o)| pred(o)).map(|(i, _)| i);
    let first = hits.next()?;
    match hits.next() {
        Some(_) => None,
        None => Some(first),
    }
}

fn by_soname(old: &SharedObject, new: &[SharedObject]) -> Option<usize> {
    let soname = old.soname.as_deref()?;
    unique_index(new, |o| o.soname.as_deref() == Some(soname))
}

fn by_basename(old: &SharedObject, new: &[SharedObject]) -> Option<usize> {
    unique_index(new, |o| o.name == old.name)
}

fn by_short_name(old: &SharedObject, new: &[SharedObject]) -> Option<usize> {
    let short = old.short_name.as_deref()?;
    unique_index(new, |o| o.short_name.as_deref() == Some(short))
}

/// Classification of both object sets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult {
    pub mappings: Vec<ObjectMapping>,
    /// New objects no mapping targets
    pub added: Vec<String>,
    /// Old objects no mapping starts from
    pub removed: Vec<String>,
}

impl MatchResult {
    pub fn mapping_for(&self, old_name: &str) -> Option<&ObjectMapping> {
        self.mappings.iter().find(|m| m.old == old_name)
    }

    /// Forget added and removed objects the predicates reject.
    ///
    /// Mappings are kept whatever their descriptors look like, so a pair with
    /// an unusable side still reads as present in both releases.
    pub fn retain_usable(
        &mut self,
        old_usable: impl Fn(&str) -> bool,
        new_usable: impl Fn(&str) -> bool,
    ) {
        self.removed.retain(|name| old_usable(name.as_str()));
        self.added.retain(|name| new_usable(name.as_str()));
    }

    pub fn soname_changes(&self) -> usize {
        self.mappings
            .iter()
            .filter(|m| m.soname_change.is_some())
            .count()
    }
}

fn soname_change(old: &SharedObject, new: &SharedObject) -> Option<(String, String)> {
    match (&old.soname, &new.soname) {
        (Some(a), Some(b)) if a != b => Some((a.clone(), b.clone())),
        _ => None,
    }
}

fn mapping(old: &SharedObject, new: &SharedObject, tier: MatchTier) -> ObjectMapping {
    ObjectMapping {
        old: old.name.clone(),
        new: new.name.clone(),
        tier,
        soname_change: soname_change(old, new),
    }
}

/// Match old objects to new ones. Objects are visited in the order given.
pub fn match_objects(old: &[SharedObject], new: &[SharedObject]) -> MatchResult {
    match_objects_where(old, new, |_| true, |_| true)
}

/// Match old objects to new ones, with the single-survivor fallback only
/// counting objects the `*_usable` predicates accept.
///
/// Tiers look at every object so that a library whose descriptor could not
/// be produced still finds its counterpart instead of reading as removed.
pub fn match_objects_where(
    old: &[SharedObject],
    new: &[SharedObject],
    old_usable: impl Fn(&SharedObject) -> bool,
    new_usable: impl Fn(&SharedObject) -> bool,
) -> MatchResult {
    let mut claimed = vec![false; new.len()];
    let mut mapped_old = vec![false; old.len()];
    let mut mappings = Vec::new();

    for (oi, o) in old.iter().enumerate() {
        let found = STRATEGIES.iter().find_map(|(tier, strategy)| {
            strategy(o, new)
                .filter(|&ni| !claimed[ni])
                .map(|ni| (*tier, ni))
        });
        if let Some((tier, ni)) = found {
            claimed[ni] = true;
            mapped_old[oi] = true;
            mappings.push(mapping(o, &new[ni], tier));
        }
    }

    if mappings.is_empty() {
        let old_left: Vec<usize> = (0..old.len()).filter(|&i| old_usable(&old[i])).collect();
        let new_left: Vec<usize> = (0..new.len()).filter(|&i| new_usable(&new[i])).collect();
        if let ([oi], [ni]) = (old_left.as_slice(), new_left.as_slice()) {
            claimed[*ni] = true;
            mapped_old[*oi] = true;
            mappings.push(mapping(&old[*oi], &new[*ni], MatchTier::SingleSurvivor));
        }
    }

    let added = new
        .iter()
        .zip(&claimed)
        .filter(|(_, c)| !**c)
        .map(|(o, _)| o.name.clone())
        .collect();
    let removed = old
        .iter()
        .zip(&mapped_old)
        .filter(|(_, m)| !**m)
        .map(|(o, _)| o.name.clone())
        .collect();

    MatchResult {
        mappings,
        added,
        removed,
    }
}
